//! Free duplex: one thread sends while another receives on the same channel.
//!
//! Run with:
//!   cargo run --example duplex-echo
//!
//! The server echoes every line back upper-cased. The client writes all of
//! its lines without waiting, and a separate thread collects the replies.

use std::sync::Arc;
use std::thread;

use linechat::peer::{connect, PeerListener};

const LINES: [&str; 4] = ["hello", "these lines", "cross in flight", "bye"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = PeerListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr().to_string();

    let server = thread::spawn(move || -> Result<(), linechat::peer::PeerError> {
        let peer = listener.accept_one()?;
        loop {
            match peer.receive_line() {
                Ok(line) => peer.send_line(&line.to_uppercase())?,
                Err(e) if e.is_disconnect() => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    });

    let client = Arc::new(connect(&addr)?);

    let reader = {
        let client = Arc::clone(&client);
        thread::spawn(move || {
            let mut replies = Vec::new();
            while replies.len() < LINES.len() {
                match client.receive_line() {
                    Ok(line) => {
                        println!("reply: {line}");
                        replies.push(line);
                    }
                    Err(e) => {
                        eprintln!("receive stopped: {e}");
                        break;
                    }
                }
            }
            replies
        })
    };

    for line in LINES {
        client.send_line(line)?;
    }

    let replies = reader.join().map_err(|_| "reader thread panicked")?;
    client.close()?;
    server.join().map_err(|_| "server thread panicked")??;

    eprintln!("{} of {} lines echoed", replies.len(), LINES.len());
    Ok(())
}

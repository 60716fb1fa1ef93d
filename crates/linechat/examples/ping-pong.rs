//! Ping-pong over loopback: a listener and a client take turns.
//!
//! Run with:
//!   cargo run --example ping-pong
//!
//! Pass a round count to change how many exchanges happen (default 3).

use std::thread;

use linechat::peer::{connect, PeerListener};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rounds: usize = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(3);

    let listener = PeerListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr().to_string();
    eprintln!("Listening on {addr}");

    let server = thread::spawn(move || -> Result<usize, linechat::peer::PeerError> {
        let peer = listener.accept_one()?;
        eprintln!("Peer connected: {}", peer.remote_addr());

        let mut answered = 0;
        loop {
            match peer.receive_line() {
                Ok(line) => {
                    println!("server got: {line}");
                    peer.send_line(&line.replace("ping", "pong"))?;
                    answered += 1;
                }
                Err(e) if e.is_disconnect() => break,
                Err(e) => return Err(e),
            }
        }
        Ok(answered)
    });

    let client = connect(&addr)?;
    for round in 1..=rounds {
        client.send_line(&format!("ping {round}"))?;
        println!("client got: {}", client.receive_line()?);
    }
    client.close()?;

    let answered = server.join().map_err(|_| "server thread panicked")??;
    eprintln!("Server answered {answered} lines");
    Ok(())
}

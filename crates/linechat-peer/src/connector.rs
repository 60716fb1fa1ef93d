use std::io::ErrorKind;

use linechat_transport::{TcpTransport, TransportError};
use tracing::info;

use crate::error::{PeerError, Result};
use crate::peer::{Peer, PeerConfig};

/// Connect to a listening peer as a client.
pub fn connect(addr: &str) -> Result<Peer> {
    connect_with_config(addr, &PeerConfig::default())
}

/// Connect with explicit configuration.
///
/// The returned peer's id is the dialed address.
pub fn connect_with_config(addr: &str, config: &PeerConfig) -> Result<Peer> {
    let stream = match config.connect_timeout {
        Some(timeout) => TcpTransport::connect_timeout(addr, timeout).map_err(|err| match err {
            TransportError::Connect { ref source, .. }
                if matches!(source.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) =>
            {
                PeerError::Timeout(timeout)
            }
            other => PeerError::Transport(other),
        })?,
        None => TcpTransport::connect(addr)?,
    };

    let peer = Peer::from_stream(addr, stream, config)?;
    info!(addr, remote_addr = %peer.remote_addr(), "connected to peer");
    Ok(peer)
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use linechat_line::LineError;

    use super::*;
    use crate::listener::PeerListener;

    #[test]
    fn connect_convenience() {
        let listener = PeerListener::bind("127.0.0.1:0").expect("listener should bind");
        let addr = listener.local_addr().to_string();

        let server = thread::spawn(move || {
            let peer = listener.accept_one().expect("listener should accept");
            let line = peer.receive_line().expect("should receive line");
            peer.send_line(&line).expect("should echo line");
        });

        let client = connect(&addr).expect("client should connect");
        assert_eq!(client.id(), addr);
        client.send_line("hello").expect("send should succeed");
        assert_eq!(client.receive_line().expect("echo"), "hello");

        server.join().expect("server thread should complete");
        let err = client.receive_line().expect_err("server is gone");
        assert!(err.is_disconnect());
    }

    #[test]
    fn connect_with_timeout_and_keepalive() {
        let listener = PeerListener::bind("127.0.0.1:0").expect("listener should bind");
        let addr = listener.local_addr().to_string();

        let config = PeerConfig {
            connect_timeout: Some(Duration::from_secs(2)),
            keepalive: true,
            ..PeerConfig::default()
        };

        let server = thread::spawn(move || listener.accept_one().expect("accept"));
        let client = connect_with_config(&addr, &config).expect("client should connect");
        let server_peer = server.join().expect("server thread");

        #[cfg(unix)]
        assert!(client
            .channel()
            .get_ref()
            .keepalive()
            .expect("keepalive readable"));

        server_peer.close().expect("close");
        let err = client.receive_line().expect_err("closed by server");
        assert!(matches!(err, PeerError::Line(LineError::ConnectionClosed)));
    }

    #[test]
    fn connect_refused_is_transport_error() {
        let listener = PeerListener::bind("127.0.0.1:0").expect("listener should bind");
        let addr = listener.local_addr().to_string();
        drop(listener);

        let err = connect(&addr).expect_err("nothing listening");
        assert!(matches!(err, PeerError::Transport(TransportError::Connect { .. })));
    }
}

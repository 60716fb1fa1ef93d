use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::ChatStream;

/// TCP transport.
///
/// Provides bind/accept/connect over IPv4 and IPv6 TCP sockets.
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on a TCP address (`host:port`).
    ///
    /// Port `0` picks an ephemeral port; see [`TcpTransport::local_addr`].
    pub fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|e| TransportError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;
        let local_addr = listener.local_addr().map_err(|e| TransportError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;

        info!(%local_addr, "listening on tcp socket");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<(ChatStream, SocketAddr)> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%peer, "accepted connection");
        Ok((ChatStream::from_tcp(stream), peer))
    }

    /// Connect to a listening TCP address (blocking).
    pub fn connect(addr: &str) -> Result<ChatStream> {
        let candidates = resolve(addr)?;
        let stream = TcpStream::connect(&candidates[..]).map_err(|e| TransportError::Connect {
            addr: addr.to_string(),
            source: e,
        })?;
        debug!(addr, "connected to tcp socket");
        Ok(ChatStream::from_tcp(stream))
    }

    /// Connect with an upper bound on each connection attempt.
    ///
    /// `addr` is resolved first; every resolved address is tried in order and
    /// the last failure is reported if none accepts.
    pub fn connect_timeout(addr: &str, timeout: Duration) -> Result<ChatStream> {
        let candidates = resolve(addr)?;

        let mut last_err = None;
        for candidate in candidates {
            match TcpStream::connect_timeout(&candidate, timeout) {
                Ok(stream) => {
                    debug!(addr, %candidate, "connected to tcp socket");
                    return Ok(ChatStream::from_tcp(stream));
                }
                Err(err) => {
                    debug!(%candidate, error = %err, "connect attempt failed");
                    last_err = Some(err);
                }
            }
        }

        let source = last_err.unwrap_or_else(|| io::Error::from(io::ErrorKind::AddrNotAvailable));
        Err(TransportError::Connect {
            addr: addr.to_string(),
            source,
        })
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

/// Resolve `addr` to at least one socket address.
fn resolve(addr: &str) -> Result<Vec<SocketAddr>> {
    let candidates: Vec<SocketAddr> = addr
        .to_socket_addrs()
        .map_err(|e| TransportError::Resolve {
            addr: addr.to_string(),
            source: Some(e),
        })?
        .collect();
    if candidates.is_empty() {
        return Err(TransportError::Resolve {
            addr: addr.to_string(),
            source: None,
        });
    }
    Ok(candidates)
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("local_addr", &self.local_addr)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Duplex;
    use std::io::{Read, Write};

    #[test]
    fn test_bind_accept_connect() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();
        assert_ne!(listener.local_addr().port(), 0);

        let handle = std::thread::spawn(move || {
            let mut client = TcpTransport::connect(&addr).unwrap();
            client.write_all(b"hello").unwrap();
        });

        let (mut server, peer) = listener.accept().unwrap();
        let mut buf = [0u8; 5];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
        assert!(peer.ip().is_loopback());

        handle.join().unwrap();
    }

    #[test]
    fn test_bind_invalid_address() {
        let result = TcpTransport::bind("not-an-address");
        assert!(matches!(result, Err(TransportError::Bind { .. })));
    }

    #[test]
    fn test_connect_refused_after_listener_dropped() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();
        drop(listener);

        let result = TcpTransport::connect(&addr);
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }

    #[test]
    fn test_connect_timeout_succeeds() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();

        let stream = TcpTransport::connect_timeout(&addr, Duration::from_secs(2)).unwrap();
        let (_server, _) = listener.accept().unwrap();
        assert_eq!(
            stream.peer_addr().unwrap().port(),
            listener.local_addr().port()
        );
    }

    #[test]
    fn test_connect_timeout_unresolvable() {
        let result = TcpTransport::connect_timeout("localhost:notaport", Duration::from_secs(1));
        assert!(matches!(
            result,
            Err(TransportError::Resolve { source: Some(_), .. })
        ));
    }

    #[test]
    fn test_connect_unresolvable_host() {
        let result = TcpTransport::connect("no-such-host.invalid:2006");
        match result {
            Err(TransportError::Resolve { addr, .. }) => {
                assert_eq!(addr, "no-such-host.invalid:2006");
            }
            other => panic!("expected resolve error, got {other:?}"),
        }
    }

    #[test]
    fn test_shutdown_both_signals_eof_to_peer() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();

        let client = TcpTransport::connect(&addr).unwrap();
        let (mut server, _) = listener.accept().unwrap();

        client.shutdown_both().unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(server.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_cloned_handles_share_connection() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();

        let client = TcpTransport::connect(&addr).unwrap();
        let (mut server, _) = listener.accept().unwrap();

        let mut writer = client.try_clone().unwrap();
        writer.write_all(b"via-clone").unwrap();
        let mut buf = [0u8; 9];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"via-clone");
    }

    #[test]
    #[cfg(unix)]
    fn test_keepalive_roundtrip() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();
        let client = TcpTransport::connect(&addr).unwrap();

        client.set_keepalive(true).unwrap();
        assert!(client.keepalive().unwrap());
        client.set_keepalive(false).unwrap();
        assert!(!client.keepalive().unwrap());
    }

    #[test]
    fn test_borrowed_stream_is_duplex() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();
        let owned = TcpStream::connect(&addr).unwrap();
        let (mut server, _) = listener.accept().unwrap();

        let borrowed = &owned;
        let mut handle = <&TcpStream as Duplex>::try_clone_handle(&borrowed).unwrap();
        assert!(std::ptr::eq(handle, &owned));
        handle.write_all(b"x").unwrap();
        let mut buf = [0u8; 1];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"x");
    }
}

use std::fmt;
use std::io;

use linechat_line::LineError;
use linechat_peer::PeerError;
use linechat_transport::TransportError;

// Exit code constants aligned with rsfulmen/DDR-0002 semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::AddrInUse
        | io::ErrorKind::AddrNotAvailable => TRANSPORT_ERROR,
        io::ErrorKind::InvalidInput => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Bind { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Accept(source)
        | TransportError::Io(source) => io_error(context, source),
        other => CliError::new(USAGE, format!("{context}: {other}")),
    }
}

pub fn line_error(context: &str, err: LineError) -> CliError {
    match err {
        LineError::Io(source) => io_error(context, source),
        LineError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        LineError::EmbeddedDelimiter { .. }
        | LineError::LineTooLong { .. }
        | LineError::InvalidUtf8(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
    }
}

pub fn peer_error(context: &str, err: PeerError) -> CliError {
    match err {
        PeerError::Transport(err) => transport_error(context, err),
        PeerError::Line(err) => line_error(context, err),
        PeerError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_connect_is_transport_error() {
        let err = peer_error(
            "connect failed",
            PeerError::Transport(TransportError::Connect {
                addr: "127.0.0.1:1".to_string(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            }),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert!(err.message.starts_with("connect failed: "));
    }

    #[test]
    fn timeout_maps_to_124() {
        let err = peer_error(
            "connect failed",
            PeerError::Timeout(std::time::Duration::from_secs(1)),
        );
        assert_eq!(err.code, TIMEOUT);

        let err = line_error(
            "receive failed",
            LineError::Io(io::Error::from(io::ErrorKind::WouldBlock)),
        );
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn protocol_violations_are_data_invalid() {
        let err = line_error("send failed", LineError::EmbeddedDelimiter { position: 0 });
        assert_eq!(err.code, DATA_INVALID);
        let err = line_error("receive failed", LineError::LineTooLong { size: 9, max: 1 });
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn unresolvable_address_is_usage() {
        let err = transport_error(
            "connect failed",
            TransportError::Resolve {
                addr: "nowhere:1".to_string(),
                source: None,
            },
        );
        assert_eq!(err.code, USAGE);
    }
}

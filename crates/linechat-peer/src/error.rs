/// Errors that can occur in peer operations.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] linechat_transport::TransportError),

    /// Line-level error.
    #[error("line error: {0}")]
    Line(#[from] linechat_line::LineError),

    /// Connecting did not complete in time.
    #[error("connect timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl PeerError {
    /// Returns true if the peer closed the connection in an orderly way.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, PeerError::Line(linechat_line::LineError::ConnectionClosed))
    }
}

pub type Result<T> = std::result::Result<T, PeerError>;

/// Errors that can occur while sending or receiving lines.
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    /// The peer closed the stream, or the channel was closed locally.
    #[error("connection closed")]
    ConnectionClosed,

    /// An I/O error occurred while reading or writing lines.
    #[error("line I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An outgoing line contains the delimiter (strict mode only).
    #[error("line contains an embedded delimiter at byte {position}")]
    EmbeddedDelimiter { position: usize },

    /// A line exceeds the configured maximum length.
    #[error("line too long ({size} bytes, max {max})")]
    LineTooLong { size: usize, max: usize },

    /// A received line is not valid UTF-8.
    #[error("line is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Coarse classification of [`LineError`] for callers that only need to
/// decide whether to stop, report, or reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Orderly shutdown by the peer or locally.
    ConnectionClosed,
    /// Transport failure or malformed read.
    Io,
    /// A line broke the framing rules.
    ProtocolViolation,
}

impl LineError {
    /// The coarse class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LineError::ConnectionClosed => ErrorKind::ConnectionClosed,
            LineError::Io(_) | LineError::InvalidUtf8(_) => ErrorKind::Io,
            LineError::EmbeddedDelimiter { .. } | LineError::LineTooLong { .. } => {
                ErrorKind::ProtocolViolation
            }
        }
    }

    /// Returns true if the connection is unusable after this error and the
    /// caller should close the channel.
    ///
    /// Protocol violations and undecodable lines leave the stream in sync.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LineError::ConnectionClosed | LineError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, LineError>;

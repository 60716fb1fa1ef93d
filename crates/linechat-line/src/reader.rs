use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use linechat_transport::ChatStream;

use crate::codec::{LineConfig, LineDecoder};
use crate::error::{LineError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete lines from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete lines.
pub struct LineReader<T> {
    inner: T,
    buf: BytesMut,
    config: LineConfig,
    decoder: LineDecoder,
    eof: bool,
}

impl<T: Read> LineReader<T> {
    /// Create a new line reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, LineConfig::default())
    }

    /// Create a new line reader with explicit configuration.
    pub fn with_config(inner: T, config: LineConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            decoder: LineDecoder::new(config.max_line_length),
            config,
            eof: false,
        }
    }

    /// Read the next complete line (blocking), delimiter stripped.
    ///
    /// At end-of-data, undelimited residue is returned once as a final line.
    /// Returns `Err(LineError::ConnectionClosed)` when nothing is left.
    pub fn read_line(&mut self) -> Result<String> {
        let line = self.read_line_bytes()?;
        let text = std::str::from_utf8(&line)?;
        Ok(text.to_owned())
    }

    /// Read the next complete line as raw bytes, delimiter stripped.
    ///
    /// An oversized line is reported once as [`LineError::LineTooLong`]; the
    /// next call resumes with the line after it.
    pub fn read_line_bytes(&mut self) -> Result<Bytes> {
        loop {
            if self.eof {
                return self
                    .decoder
                    .decode_eof(&mut self.buf)?
                    .ok_or(LineError::ConnectionClosed);
            }

            if let Some(line) = self.decoder.decode(&mut self.buf)? {
                return Ok(line);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(LineError::Io(err)),
            };

            if read == 0 {
                self.eof = true;
                continue;
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Bytes read from the stream but not yet returned as a line.
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    /// Returns true once the stream has reported end-of-data.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    ///
    /// Buffered bytes are discarded.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum line length for subsequent decoding.
    pub fn set_max_line_length(&mut self, max_line_length: usize) {
        self.config.max_line_length = max_line_length;
        self.decoder.set_max_line_length(max_line_length);
    }

    /// Current line reader configuration.
    pub fn config(&self) -> &LineConfig {
        &self.config
    }
}

impl LineReader<ChatStream> {
    /// Create a line reader for `ChatStream` and apply read timeout from config.
    pub fn with_config_stream(inner: ChatStream, config: LineConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_line_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_line_error(err: linechat_transport::TransportError) -> LineError {
    match err {
        linechat_transport::TransportError::Io(io)
        | linechat_transport::TransportError::Accept(io) => LineError::Io(io),
        linechat_transport::TransportError::Bind { source, .. }
        | linechat_transport::TransportError::Connect { source, .. } => LineError::Io(source),
        other => LineError::Io(std::io::Error::other(other.to_string())),
    }
}

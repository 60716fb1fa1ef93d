use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use linechat_transport::ChatStream;

use crate::codec::{check_line, encode_line, LineConfig};
use crate::error::{LineError, Result};
use crate::reader::transport_to_line_error;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Writes complete lines to any `Write` stream.
pub struct LineWriter<T> {
    inner: T,
    buf: BytesMut,
    config: LineConfig,
}

impl<T: Write> LineWriter<T> {
    /// Create a new line writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, LineConfig::default())
    }

    /// Create a new line writer with explicit configuration.
    pub fn with_config(inner: T, config: LineConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode and send one line plus its delimiter (blocking).
    ///
    /// Partial writes are retried until every byte is on the wire. Lines over
    /// `max_line_length` fail with [`LineError::LineTooLong`] and are not sent.
    pub fn send_line(&mut self, line: &str) -> Result<()> {
        if self.config.strict {
            check_line(line)?;
        }
        if line.len() > self.config.max_line_length {
            return Err(LineError::LineTooLong {
                size: line.len(),
                max: self.config.max_line_length,
            });
        }

        self.buf.clear();
        encode_line(line, &mut self.buf);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(LineError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(write_error(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(write_error(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current line writer configuration.
    pub fn config(&self) -> &LineConfig {
        &self.config
    }
}

impl LineWriter<ChatStream> {
    /// Create a line writer for `ChatStream` and apply write timeout from config.
    pub fn with_config_stream(inner: ChatStream, config: LineConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_line_error)?;
        Ok(Self::with_config(inner, config))
    }
}

// A peer that has gone away shows up as EPIPE or ECONNABORTED on write.
fn write_error(err: std::io::Error) -> LineError {
    match err.kind() {
        ErrorKind::BrokenPipe | ErrorKind::ConnectionAborted => LineError::ConnectionClosed,
        _ => LineError::Io(err),
    }
}

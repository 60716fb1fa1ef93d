//! Line codec for tokio streams.
//!
//! Use [`LineCodec`] with [`tokio_util::codec::FramedRead`] (inbound) and
//! [`tokio_util::codec::FramedWrite`] (outbound) to get the same framing as
//! the blocking [`LineChannel`](crate::LineChannel) in a cooperative model:
//! the trailing undelimited line is yielded once at end-of-stream, then the
//! stream ends.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{check_line, encode_line, LineConfig, LineDecoder};
use crate::error::{LineError, Result};

/// Newline codec for async line streams.
#[derive(Debug, Clone)]
pub struct LineCodec {
    decoder: LineDecoder,
    strict: bool,
}

impl LineCodec {
    /// Create a codec with the default limits.
    pub fn new() -> Self {
        Self::from_config(&LineConfig::default())
    }

    /// Create a codec from a line configuration. Timeouts are ignored; impose
    /// them with `tokio::time::timeout` around the stream.
    pub fn from_config(config: &LineConfig) -> Self {
        Self {
            decoder: LineDecoder::new(config.max_line_length),
            strict: config.strict,
        }
    }

    /// Maximum accepted line length.
    pub fn max_line_length(&self) -> usize {
        self.decoder.max_line_length()
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = LineError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        self.decoder
            .decode(src)?
            .map(into_text)
            .transpose()
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        self.decoder
            .decode_eof(src)?
            .map(into_text)
            .transpose()
    }
}

impl Encoder<&str> for LineCodec {
    type Error = LineError;

    fn encode(&mut self, line: &str, dst: &mut BytesMut) -> Result<()> {
        if self.strict {
            check_line(line)?;
        }
        let max = self.decoder.max_line_length();
        if line.len() > max {
            return Err(LineError::LineTooLong {
                size: line.len(),
                max,
            });
        }
        encode_line(line, dst);
        Ok(())
    }
}

impl Encoder<String> for LineCodec {
    type Error = LineError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<()> {
        Encoder::<&str>::encode(self, line.as_str(), dst)
    }
}

fn into_text(line: Bytes) -> Result<String> {
    Ok(std::str::from_utf8(&line)?.to_owned())
}

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{LineError, Result};

/// The byte that terminates every line on the wire.
pub const DELIMITER: u8 = b'\n';

/// Default maximum line length (excluding the delimiter): 64 KiB.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Encode a line into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────────────────┬───────────┐
/// │ UTF-8 text (N bytes)   │ 0x0A '\n' │
/// └────────────────────────┴───────────┘
/// ```
///
/// The text is written as-is; an embedded `\n` becomes a line boundary on the
/// receiving side. Use [`check_line`] first to reject it instead.
pub fn encode_line(line: &str, dst: &mut BytesMut) {
    dst.reserve(line.len() + 1);
    dst.put_slice(line.as_bytes());
    dst.put_u8(DELIMITER);
}

/// Reject a line that contains the delimiter.
pub fn check_line(line: &str) -> Result<()> {
    match find_delimiter(line.as_bytes()) {
        Some(position) => Err(LineError::EmbeddedDelimiter { position }),
        None => Ok(()),
    }
}

/// Decode a line from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a delimiter yet.
/// On success, consumes the line and its delimiter from the buffer and
/// returns the line bytes without the delimiter.
///
/// A delimited line longer than `max_line_length` is consumed and reported as
/// [`LineError::LineTooLong`]. An undelimited buffer longer than the limit is
/// reported without being consumed; stream readers should go through
/// [`LineDecoder`], which drops the rest of such a line.
pub fn decode_line(src: &mut BytesMut, max_line_length: usize) -> Result<Option<Bytes>> {
    let Some(pos) = find_delimiter(src) else {
        if src.len() > max_line_length {
            return Err(LineError::LineTooLong {
                size: src.len(),
                max: max_line_length,
            });
        }
        return Ok(None); // Need more data
    };

    let line = src.split_to(pos).freeze();
    src.advance(1);

    if line.len() > max_line_length {
        return Err(LineError::LineTooLong {
            size: line.len(),
            max: max_line_length,
        });
    }

    Ok(Some(line))
}

/// Decode a line once the stream has reached end-of-data.
///
/// Behaves like [`decode_line`] while delimited lines remain. After that, any
/// residual bytes are returned as a final line and the buffer is left empty.
/// Returns `Ok(None)` only when nothing is left.
pub fn decode_line_eof(src: &mut BytesMut, max_line_length: usize) -> Result<Option<Bytes>> {
    if find_delimiter(src).is_some() {
        return decode_line(src, max_line_length);
    }
    if src.is_empty() {
        return Ok(None);
    }

    let residue = src.split().freeze();
    if residue.len() > max_line_length {
        return Err(LineError::LineTooLong {
            size: residue.len(),
            max: max_line_length,
        });
    }
    Ok(Some(residue))
}

/// Stream-side line decoder that resynchronizes after an oversized line.
///
/// When an undelimited buffer grows past the limit, the buffered bytes are
/// dropped and [`LineError::LineTooLong`] is reported once. Incoming bytes are
/// then discarded through the next delimiter, and decoding resumes with the
/// line after it.
#[derive(Debug, Clone)]
pub struct LineDecoder {
    max_line_length: usize,
    discarding: bool,
}

impl LineDecoder {
    pub fn new(max_line_length: usize) -> Self {
        Self {
            max_line_length,
            discarding: false,
        }
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    pub fn set_max_line_length(&mut self, max_line_length: usize) {
        self.max_line_length = max_line_length;
    }

    /// True while the tail of an oversized line is being dropped.
    pub fn is_discarding(&self) -> bool {
        self.discarding
    }

    /// Like [`decode_line`], but never reports the same oversized line twice.
    pub fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        if !self.skip_discarded(src) {
            return Ok(None);
        }
        if src.len() > self.max_line_length && find_delimiter(src).is_none() {
            let size = src.len();
            src.clear();
            self.discarding = true;
            return Err(LineError::LineTooLong {
                size,
                max: self.max_line_length,
            });
        }
        decode_line(src, self.max_line_length)
    }

    /// Like [`decode_line_eof`]. A stream that ends inside a discarded line
    /// yields nothing more.
    pub fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        if !self.skip_discarded(src) {
            self.discarding = false;
            return Ok(None);
        }
        decode_line_eof(src, self.max_line_length)
    }

    // Returns false while the buffer still lies inside an oversized line.
    fn skip_discarded(&mut self, src: &mut BytesMut) -> bool {
        if !self.discarding {
            return true;
        }
        match find_delimiter(src) {
            Some(pos) => {
                src.advance(pos + 1);
                self.discarding = false;
                true
            }
            None => {
                src.clear();
                false
            }
        }
    }
}

fn find_delimiter(bytes: &[u8]) -> Option<usize> {
    bytes.iter().position(|b| *b == DELIMITER)
}

/// Configuration for the line codec.
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Maximum line length in bytes, delimiter excluded. Default: 64 KiB.
    pub max_line_length: usize,
    /// Reject outgoing lines that contain the delimiter. Default: off.
    pub strict: bool,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            strict: false,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_appends_delimiter() {
        let mut buf = BytesMut::new();
        encode_line("hello", &mut buf);
        assert_eq!(buf.as_ref(), b"hello\n");
    }

    #[test]
    fn test_decode_waits_for_delimiter() {
        let mut buf = BytesMut::from(&b"partial"[..]);
        let result = decode_line(&mut buf, DEFAULT_MAX_LINE_LENGTH).unwrap();
        assert!(result.is_none());
        assert_eq!(buf.as_ref(), b"partial");
    }

    #[test]
    fn test_decode_leaves_bytes_after_first_delimiter() {
        let mut buf = BytesMut::from(&b"one\ntwo\nthr"[..]);

        let first = decode_line(&mut buf, DEFAULT_MAX_LINE_LENGTH)
            .unwrap()
            .unwrap();
        assert_eq!(first.as_ref(), b"one");
        assert_eq!(buf.as_ref(), b"two\nthr");

        let second = decode_line(&mut buf, DEFAULT_MAX_LINE_LENGTH)
            .unwrap()
            .unwrap();
        assert_eq!(second.as_ref(), b"two");
        assert_eq!(buf.as_ref(), b"thr");

        assert!(decode_line(&mut buf, DEFAULT_MAX_LINE_LENGTH)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_empty_line() {
        let mut buf = BytesMut::from(&b"\n"[..]);
        let line = decode_line(&mut buf, DEFAULT_MAX_LINE_LENGTH)
            .unwrap()
            .unwrap();
        assert!(line.is_empty());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_eof_flushes_residue() {
        let mut buf = BytesMut::from(&b"a\nhello"[..]);

        let a = decode_line_eof(&mut buf, DEFAULT_MAX_LINE_LENGTH)
            .unwrap()
            .unwrap();
        assert_eq!(a.as_ref(), b"a");

        let residue = decode_line_eof(&mut buf, DEFAULT_MAX_LINE_LENGTH)
            .unwrap()
            .unwrap();
        assert_eq!(residue.as_ref(), b"hello");
        assert!(buf.is_empty());

        assert!(decode_line_eof(&mut buf, DEFAULT_MAX_LINE_LENGTH)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_undelimited_overflow_rejected() {
        let mut buf = BytesMut::from(&b"abcdefgh"[..]);
        let result = decode_line(&mut buf, 4);
        assert!(matches!(
            result,
            Err(LineError::LineTooLong { size: 8, max: 4 })
        ));
    }

    #[test]
    fn test_delimited_overflow_consumed() {
        let mut buf = BytesMut::from(&b"abcdefgh\nok\n"[..]);
        let result = decode_line(&mut buf, 4);
        assert!(matches!(result, Err(LineError::LineTooLong { .. })));

        let next = decode_line(&mut buf, 4).unwrap().unwrap();
        assert_eq!(next.as_ref(), b"ok");
    }

    #[test]
    fn test_decoder_resyncs_after_undelimited_overflow() {
        let mut decoder = LineDecoder::new(4);
        let mut buf = BytesMut::from(&b"abcdef"[..]);

        let err = decoder.decode(&mut buf).unwrap_err();
        assert!(matches!(err, LineError::LineTooLong { size: 6, max: 4 }));
        assert!(buf.is_empty());
        assert!(decoder.is_discarding());

        // Still inside the oversized line: dropped, no second error.
        buf.extend_from_slice(b"gh");
        assert!(decoder.decode(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());

        buf.extend_from_slice(b"ij\nok\n");
        let next = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(next.as_ref(), b"ok");
        assert!(!decoder.is_discarding());
    }

    #[test]
    fn test_decoder_eof_inside_discarded_line() {
        let mut decoder = LineDecoder::new(2);
        let mut buf = BytesMut::from(&b"xyz"[..]);
        assert!(decoder.decode(&mut buf).is_err());

        buf.extend_from_slice(b"tail");
        assert!(decoder.decode_eof(&mut buf).unwrap().is_none());
        assert!(decoder.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_line_at_limit_accepted() {
        let mut buf = BytesMut::from(&b"abcd\n"[..]);
        let line = decode_line(&mut buf, 4).unwrap().unwrap();
        assert_eq!(line.as_ref(), b"abcd");
    }

    #[test]
    fn test_check_line_reports_position() {
        assert!(check_line("fine").is_ok());
        let err = check_line("ab\ncd").unwrap_err();
        assert!(matches!(err, LineError::EmbeddedDelimiter { position: 2 }));
    }

    #[test]
    fn test_default_config() {
        let cfg = LineConfig::default();
        assert_eq!(cfg.max_line_length, DEFAULT_MAX_LINE_LENGTH);
        assert!(!cfg.strict);
        assert!(cfg.read_timeout.is_none());
        assert!(cfg.write_timeout.is_none());
    }
}

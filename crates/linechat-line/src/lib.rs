//! Newline-delimited message framing over a duplex byte stream.
//!
//! This is the core value-add layer of linechat. Every message on the wire is
//! UTF-8 text terminated by a single `\n`:
//! - no length prefix, no escaping
//! - partial reads are reassembled, multi-line reads are split
//! - a trailing unterminated line is flushed once at end-of-data
//!
//! No partial reads, no buffer management in user code.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod channel;
pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::LineCodec;
pub use channel::{ChannelState, LineChannel};
pub use codec::{
    check_line, decode_line, decode_line_eof, encode_line, LineConfig, LineDecoder, DEFAULT_MAX_LINE_LENGTH,
    DELIMITER,
};
pub use error::{ErrorKind, LineError, Result};
pub use reader::LineReader;
pub use writer::LineWriter;

//! TCP transport for linechat.
//!
//! Provides the listening/dialing side of a chat connection and the
//! [`Duplex`] seam the line layer is generic over:
//! - [`TcpTransport`] binds, accepts and connects
//! - [`ChatStream`] is a connected TCP stream with socket knobs
//! - [`Duplex`] is any stream that can be cloned per direction and shut down
//!
//! This is the lowest layer of linechat. Everything else builds on top of
//! the [`ChatStream`] type provided here.

pub mod error;
pub mod tcp;
pub mod traits;

pub use error::{Result, TransportError};
pub use tcp::TcpTransport;
pub use traits::{ChatStream, Duplex};

//! Single-connection peer setup for linechat.
//!
//! This is the "just works" layer. Listen for exactly one peer or dial one,
//! and get back a [`Peer`] that sends and receives whole lines.

pub mod connector;
pub mod error;
pub mod listener;
pub mod peer;

pub use connector::{connect, connect_with_config};
pub use error::{PeerError, Result};
pub use listener::PeerListener;
pub use peer::{Peer, PeerConfig};

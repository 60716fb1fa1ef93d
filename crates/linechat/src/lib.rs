//! Line-oriented two-process TCP chat.
//!
//! One process listens and accepts a single connection, the other dials in;
//! both then exchange newline-delimited text until either side closes.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP listen/accept/connect and the `Duplex` stream seam
//! - [`line`]: `LineChannel`: whole-line send/receive over one stream
//! - [`peer`]: Single-connection setup (behind `peer` feature)

/// Re-export transport types.
pub mod transport {
    pub use linechat_transport::*;
}

/// Re-export line types.
pub mod line {
    pub use linechat_line::*;
}

/// Re-export peer types (requires `peer` feature).
#[cfg(feature = "peer")]
pub mod peer {
    pub use linechat_peer::*;
}

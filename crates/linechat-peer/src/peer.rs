use std::net::SocketAddr;
use std::time::Duration;

use linechat_line::{ChannelState, LineChannel, LineConfig};
use linechat_transport::ChatStream;
use tracing::debug;

use crate::error::Result;

/// Peer connection behavior.
#[derive(Debug, Clone)]
pub struct PeerConfig {
    /// Line framing and socket timeouts.
    pub line: LineConfig,
    /// Upper bound on each connection attempt when dialing.
    pub connect_timeout: Option<Duration>,
    /// Disable Nagle's algorithm so short chat lines go out immediately.
    pub nodelay: bool,
    /// Enable TCP keepalive probes.
    pub keepalive: bool,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            line: LineConfig::default(),
            connect_timeout: None,
            nodelay: true,
            keepalive: false,
        }
    }
}

/// One end of an established chat connection.
///
/// All methods take `&self`; share an `Arc<Peer>` between one reading
/// thread and one writing thread for free duplex.
#[derive(Debug)]
pub struct Peer {
    id: String,
    remote_addr: SocketAddr,
    channel: LineChannel<ChatStream>,
}

impl Peer {
    /// Build a peer from a connected stream, applying socket options.
    pub fn from_stream(id: &str, stream: ChatStream, config: &PeerConfig) -> Result<Self> {
        let remote_addr = stream.peer_addr()?;
        stream.set_nodelay(config.nodelay)?;
        if config.keepalive {
            stream.set_keepalive(true)?;
        }

        let channel = LineChannel::from_chat_stream(stream, config.line.clone())?;
        debug!(peer_id = id, %remote_addr, "peer ready");

        Ok(Self {
            id: id.to_string(),
            remote_addr,
            channel,
        })
    }

    /// Display identifier, e.g. `peer-1` or the dialed address.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Address of the other end.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Send one line.
    pub fn send_line(&self, line: &str) -> Result<()> {
        self.channel.send_line(line).map_err(Into::into)
    }

    /// Receive the next line (blocking).
    pub fn receive_line(&self) -> Result<String> {
        self.channel.receive_line().map_err(Into::into)
    }

    /// Close the connection. Idempotent.
    pub fn close(&self) -> Result<()> {
        self.channel.close()?;
        debug!(peer_id = %self.id, "peer closed");
        Ok(())
    }

    /// Current channel state.
    pub fn state(&self) -> ChannelState {
        self.channel.state()
    }

    /// Borrow the underlying line channel.
    pub fn channel(&self) -> &LineChannel<ChatStream> {
        &self.channel
    }

    /// Give up the peer wrapper and keep only its line channel.
    pub fn into_channel(self) -> LineChannel<ChatStream> {
        self.channel
    }
}

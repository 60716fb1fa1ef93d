use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use linechat_transport::TcpTransport;
use tracing::info;

use crate::error::Result;
use crate::peer::{Peer, PeerConfig};

/// Listens for peer connections.
pub struct PeerListener {
    transport: TcpTransport,
    peer_config: PeerConfig,
    next_peer_id: AtomicU64,
}

impl PeerListener {
    /// Bind to a TCP address (`host:port`).
    pub fn bind(addr: &str) -> Result<Self> {
        let transport = TcpTransport::bind(addr)?;
        Ok(Self {
            transport,
            peer_config: PeerConfig::default(),
            next_peer_id: AtomicU64::new(1),
        })
    }

    /// Override peer behavior config.
    pub fn with_config(mut self, config: PeerConfig) -> Self {
        self.peer_config = config;
        self
    }

    /// The bound address (resolves port `0`).
    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    /// Accept the next connection and assign an auto-generated peer id.
    ///
    /// The listener keeps listening; see [`PeerListener::accept_one`] for the
    /// single-connection flow.
    pub fn accept(&self) -> Result<Peer> {
        let id = self.next_peer_id.fetch_add(1, Ordering::Relaxed);
        let (stream, remote_addr) = self.transport.accept()?;
        info!(%remote_addr, "connected to peer");
        Peer::from_stream(&format!("peer-{id}"), stream, &self.peer_config)
    }

    /// Accept exactly one connection, then stop listening.
    ///
    /// Later dial attempts against the same address are refused.
    pub fn accept_one(self) -> Result<Peer> {
        let peer = self.accept()?;
        drop(self);
        Ok(peer)
    }
}

impl Drop for PeerListener {
    fn drop(&mut self) {
        tracing::debug!(local_addr = %self.transport.local_addr(), "listener closed");
    }
}

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::Result;

/// A connected, bidirectional byte stream that can be driven from two
/// directions at once.
///
/// The line layer keeps one handle for reading, one for writing and one for
/// shutting the connection down, so a blocked reader never holds up
/// `close()`.
pub trait Duplex: Read + Write + Sized {
    /// Produce another handle to the same underlying connection.
    fn try_clone_handle(&self) -> io::Result<Self>;

    /// Shut down both directions of the connection.
    ///
    /// Every handle observes the shutdown; the peer sees end-of-data.
    fn shutdown_both(&self) -> io::Result<()>;
}

impl Duplex for TcpStream {
    fn try_clone_handle(&self) -> io::Result<Self> {
        self.try_clone()
    }

    fn shutdown_both(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

/// A borrowed stream: the caller keeps ownership and every handle is the
/// same reference. Closing (or dropping) a channel built on it still shuts
/// down the caller's socket in both directions.
impl Duplex for &TcpStream {
    fn try_clone_handle(&self) -> io::Result<Self> {
        Ok(*self)
    }

    fn shutdown_both(&self) -> io::Result<()> {
        (*self).shutdown(Shutdown::Both)
    }
}

#[cfg(unix)]
impl Duplex for std::os::unix::net::UnixStream {
    fn try_clone_handle(&self) -> io::Result<Self> {
        self.try_clone()
    }

    fn shutdown_both(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

/// A connected chat stream: implements Read + Write.
///
/// This is the fundamental I/O type returned by transport operations.
pub struct ChatStream {
    inner: TcpStream,
}

impl Read for ChatStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for ChatStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Duplex for ChatStream {
    fn try_clone_handle(&self) -> io::Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self::from_tcp(cloned))
    }

    fn shutdown_both(&self) -> io::Result<()> {
        self.inner.shutdown(Shutdown::Both)
    }
}

impl ChatStream {
    /// Wrap an already-connected TCP stream.
    pub fn from_tcp(stream: TcpStream) -> Self {
        Self { inner: stream }
    }

    /// Address of the connected peer.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        self.inner.peer_addr().map_err(Into::into)
    }

    /// Local address of this end of the connection.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.inner.local_addr().map_err(Into::into)
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Enable or disable Nagle's algorithm.
    pub fn set_nodelay(&self, nodelay: bool) -> Result<()> {
        self.inner.set_nodelay(nodelay).map_err(Into::into)
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        self.try_clone_handle().map_err(Into::into)
    }

    /// Borrow the underlying TCP stream.
    pub fn as_tcp(&self) -> &TcpStream {
        &self.inner
    }

    /// Toggle `SO_KEEPALIVE` on the socket.
    #[cfg(unix)]
    pub fn set_keepalive(&self, enabled: bool) -> Result<()> {
        use std::os::fd::AsRawFd;

        let fd = self.inner.as_raw_fd();
        let value: libc::c_int = libc::c_int::from(enabled);

        // SAFETY: `value` lives for the duration of the call and its size is
        // passed alongside it; `fd` is an open socket owned by this stream.
        let rc = unsafe {
            libc::setsockopt(
                fd,
                libc::SOL_SOCKET,
                libc::SO_KEEPALIVE,
                (&value as *const libc::c_int).cast::<libc::c_void>(),
                std::mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        };

        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error().into())
        }
    }

    /// Toggle `SO_KEEPALIVE` on the socket.
    ///
    /// Not supported on this platform; always succeeds without effect.
    #[cfg(not(unix))]
    pub fn set_keepalive(&self, enabled: bool) -> Result<()> {
        tracing::debug!(enabled, "keepalive not supported on this platform");
        Ok(())
    }

    /// Read back `SO_KEEPALIVE` (Unix only).
    #[cfg(unix)]
    pub fn keepalive(&self) -> Result<bool> {
        use std::os::fd::AsRawFd;

        let fd = self.inner.as_raw_fd();
        let mut value: libc::c_int = 0;
        let mut len = std::mem::size_of::<libc::c_int>() as libc::socklen_t;

        // SAFETY: `value` and `len` are valid writable pointers for the provided sizes,
        // and `fd` is an open socket owned by this stream.
        let rc = unsafe {
            libc::getsockopt(
                fd,
                libc::SOL_SOCKET,
                libc::SO_KEEPALIVE,
                (&mut value as *mut libc::c_int).cast::<libc::c_void>(),
                &mut len,
            )
        };

        if rc == 0 {
            Ok(value != 0)
        } else {
            Err(io::Error::last_os_error().into())
        }
    }
}

impl std::fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("ChatStream");
        s.field("type", &"tcp");
        if let Ok(peer) = self.inner.peer_addr() {
            s.field("peer", &peer);
        }
        s.finish()
    }
}

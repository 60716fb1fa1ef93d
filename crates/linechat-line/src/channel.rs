//! Line-framed duplex channel over one connected stream.
//!
//! The read half and the write half sit behind separate locks and own
//! separate handles of the stream, so one thread may block in
//! [`LineChannel::receive_line`] while another calls
//! [`LineChannel::send_line`]. A third handle is kept for
//! [`LineChannel::close`], which therefore never waits on either half.
//!
//! Multiple concurrent readers (or writers) serialize on the lock; the order
//! in which they are served is unspecified.

use std::io::ErrorKind as IoErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use linechat_transport::{ChatStream, Duplex};

use crate::codec::LineConfig;
use crate::error::{LineError, Result};
use crate::reader::{transport_to_line_error, LineReader};
use crate::writer::LineWriter;

/// Lifecycle of a [`LineChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Lines can be sent and received.
    Open,
    /// `close()` has succeeded. Terminal.
    Closed,
}

/// Sends and receives whole lines over one established duplex stream.
pub struct LineChannel<S: Duplex> {
    reader: Mutex<LineReader<S>>,
    writer: Mutex<LineWriter<S>>,
    control: S,
    closed: AtomicBool,
}

impl<S: Duplex> LineChannel<S> {
    /// Wrap a connected stream with default configuration.
    pub fn new(stream: S) -> Result<Self> {
        Self::with_config(stream, LineConfig::default())
    }

    /// Wrap a connected stream with explicit configuration.
    ///
    /// Socket timeouts in `config` are not applied here; see
    /// [`LineChannel::from_chat_stream`].
    pub fn with_config(stream: S, config: LineConfig) -> Result<Self> {
        let reader_stream = stream.try_clone_handle()?;
        let control = stream.try_clone_handle()?;

        Ok(Self {
            reader: Mutex::new(LineReader::with_config(reader_stream, config.clone())),
            writer: Mutex::new(LineWriter::with_config(stream, config)),
            control,
            closed: AtomicBool::new(false),
        })
    }

    /// Send one line. The delimiter is appended.
    ///
    /// A line longer than the configured `max_line_length` is rejected with
    /// [`LineError::LineTooLong`] before anything is written, strict or not.
    pub fn send_line(&self, line: &str) -> Result<()> {
        self.ensure_open()?;
        lock(&self.writer).send_line(line)
    }

    /// Receive the next whole line, delimiter stripped (blocking).
    ///
    /// Returns `Err(LineError::ConnectionClosed)` once the peer has closed and
    /// every buffered byte has been returned. An oversized line is reported
    /// once as [`LineError::LineTooLong`] and skipped.
    pub fn receive_line(&self) -> Result<String> {
        self.ensure_open()?;
        lock(&self.reader).read_line()
    }

    /// Shut the stream down in both directions.
    ///
    /// Idempotent. A receive blocked on another thread returns once the
    /// shutdown lands.
    pub fn close(&self) -> Result<()> {
        // Mark first: a reader woken by the shutdown must already see Closed.
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        match self.control.shutdown_both() {
            Ok(()) => Ok(()),
            // The peer already tore the connection down.
            Err(err) if err.kind() == IoErrorKind::NotConnected => Ok(()),
            Err(err) => {
                self.closed.store(false, Ordering::SeqCst);
                Err(LineError::Io(err))
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChannelState {
        if self.closed.load(Ordering::SeqCst) {
            ChannelState::Closed
        } else {
            ChannelState::Open
        }
    }

    /// Returns true once `close()` has succeeded.
    pub fn is_closed(&self) -> bool {
        self.state() == ChannelState::Closed
    }

    /// Borrow the handle used for shutdown.
    pub fn get_ref(&self) -> &S {
        &self.control
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(LineError::ConnectionClosed);
        }
        Ok(())
    }
}

impl LineChannel<ChatStream> {
    /// Wrap a `ChatStream` and apply the read/write timeouts from config.
    pub fn from_chat_stream(stream: ChatStream, config: LineConfig) -> Result<Self> {
        // Timeouts are per socket, so setting them once covers every handle.
        stream
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_line_error)?;
        stream
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_line_error)?;
        Self::with_config(stream, config)
    }
}

impl<S: Duplex> Drop for LineChannel<S> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl<S: Duplex> std::fmt::Debug for LineChannel<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineChannel")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// A panic on the other half must not wedge this one.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

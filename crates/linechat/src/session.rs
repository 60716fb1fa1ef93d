//! Chat session policy on top of a [`LineChannel`].
//!
//! The channel itself has no turn order. A session either alternates
//! (send one console line, receive one peer line, repeat) or runs free
//! duplex with a reader thread. Console input is pumped from its own thread
//! so an interrupt or a peer disconnect never waits on stdin.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use linechat_line::{LineChannel, LineError};
use linechat_transport::Duplex;
use tracing::{debug, warn};

use crate::console::Console;
use crate::exit::{io_error, line_error, CliError, CliResult, INTERNAL};
use crate::output::{print_disconnected, print_line, OutputFormat};

/// Who moves first in a turn-taking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Send,
    Receive,
}

impl Turn {
    fn next(self) -> Self {
        match self {
            Turn::Send => Turn::Receive,
            Turn::Receive => Turn::Send,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Turns(Turn),
    Duplex,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub mode: Mode,
    pub format: OutputFormat,
    /// Label printed in front of received lines.
    pub peer_label: String,
}

/// Why a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Console input reached end-of-file; the channel was closed.
    InputClosed,
    /// The peer closed the connection.
    PeerDisconnected,
    /// Ctrl-C (or another interrupter) closed the channel.
    Interrupted,
}

enum Event {
    Input(io::Result<Option<String>>),
    Incoming(Result<String, LineError>),
    Interrupt,
}

enum Step {
    Continue,
    /// Stay on the current turn.
    Retry,
    End(SessionEnd),
}

/// Closes the session's channel from another thread and wakes the session.
pub struct Interrupter<S: Duplex> {
    channel: Arc<LineChannel<S>>,
    events: Sender<Event>,
}

impl<S: Duplex> Interrupter<S> {
    pub fn interrupt(&self) {
        if let Err(err) = self.channel.close() {
            warn!(error = %err, "closing channel on interrupt failed");
        }
        let _ = self.events.send(Event::Interrupt);
    }
}

pub struct Session<S: Duplex> {
    channel: Arc<LineChannel<S>>,
    events_tx: Sender<Event>,
    events_rx: Receiver<Event>,
    options: SessionOptions,
}

impl<S> Session<S>
where
    S: Duplex + Send + Sync + 'static,
{
    pub fn new(channel: Arc<LineChannel<S>>, options: SessionOptions) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            channel,
            events_tx,
            events_rx,
            options,
        }
    }

    pub fn interrupter(&self) -> Interrupter<S> {
        Interrupter {
            channel: Arc::clone(&self.channel),
            events: self.events_tx.clone(),
        }
    }

    /// Pump console lines into the session from a detached thread.
    pub fn spawn_console<R, P>(&self, mut console: Console<R, P>)
    where
        R: BufRead + Send + 'static,
        P: Write + Send + 'static,
    {
        let events = self.events_tx.clone();
        thread::spawn(move || loop {
            let next = console.next_line();
            let done = !matches!(next, Ok(Some(_)));
            if events.send(Event::Input(next)).is_err() || done {
                return;
            }
        });
    }

    pub fn run(self, out: &mut impl Write) -> CliResult<SessionEnd> {
        match self.options.mode {
            Mode::Turns(first) => self.run_turns(first, out),
            Mode::Duplex => self.run_duplex(out),
        }
    }

    fn run_turns(self, first: Turn, out: &mut impl Write) -> CliResult<SessionEnd> {
        let mut turn = first;
        loop {
            match turn {
                Turn::Send => match self.events_rx.recv() {
                    Ok(Event::Input(input)) => match self.handle_input(input)? {
                        Step::Continue => {}
                        Step::Retry => continue,
                        Step::End(end) => return Ok(end),
                    },
                    Ok(Event::Interrupt) => return Ok(SessionEnd::Interrupted),
                    Ok(Event::Incoming(_)) => continue,
                    Err(_) => return Ok(self.finish_input()),
                },
                Turn::Receive => match self.handle_incoming(self.channel.receive_line(), out)? {
                    Step::Continue => {}
                    Step::Retry => continue,
                    Step::End(end) => return Ok(end),
                },
            }
            turn = turn.next();
        }
    }

    fn run_duplex(self, out: &mut impl Write) -> CliResult<SessionEnd> {
        let reader = {
            let channel = Arc::clone(&self.channel);
            let events = self.events_tx.clone();
            thread::spawn(move || loop {
                let incoming = channel.receive_line();
                let stop = matches!(&incoming, Err(err) if err.is_fatal());
                if events.send(Event::Incoming(incoming)).is_err() || stop {
                    return;
                }
            })
        };

        let result = loop {
            let event = match self.events_rx.recv() {
                Ok(event) => event,
                Err(_) => break Ok(self.finish_input()),
            };
            let step = match event {
                Event::Input(input) => self.handle_input(input),
                Event::Incoming(incoming) => self.handle_incoming(incoming, out),
                Event::Interrupt => Ok(Step::End(SessionEnd::Interrupted)),
            };
            match step {
                Ok(Step::Continue | Step::Retry) => continue,
                Ok(Step::End(end)) => break Ok(end),
                Err(err) => break Err(err),
            }
        };

        // Closing releases the reader if it is still blocked.
        let _ = self.channel.close();
        if reader.join().is_err() {
            return Err(CliError::new(INTERNAL, "reader thread panicked"));
        }
        result
    }

    fn handle_input(&self, input: io::Result<Option<String>>) -> CliResult<Step> {
        let line = match input {
            Ok(Some(line)) => line,
            Ok(None) => return Ok(Step::End(self.finish_input())),
            Err(err) => return Err(io_error("console read failed", err)),
        };

        match self.channel.send_line(&line) {
            Ok(()) => Ok(Step::Continue),
            Err(LineError::ConnectionClosed) => Ok(Step::End(self.closed_end())),
            Err(err) if !err.is_fatal() => {
                warn!(error = %err, "line not sent");
                Ok(Step::Retry)
            }
            Err(err) => Err(line_error("send failed", err)),
        }
    }

    fn handle_incoming(
        &self,
        incoming: Result<String, LineError>,
        out: &mut impl Write,
    ) -> CliResult<Step> {
        match incoming {
            Ok(line) => {
                print_line(out, &self.options.peer_label, &line, self.options.format)
                    .map_err(|err| io_error("stdout write failed", err))?;
                Ok(Step::Continue)
            }
            Err(LineError::ConnectionClosed) => {
                let end = self.closed_end();
                if end == SessionEnd::PeerDisconnected {
                    print_disconnected(out, &self.options.peer_label, self.options.format)
                        .map_err(|err| io_error("stdout write failed", err))?;
                }
                Ok(Step::End(end))
            }
            Err(err) if !err.is_fatal() => {
                warn!(error = %err, "dropped unreadable line");
                Ok(Step::Retry)
            }
            Err(err) => Err(line_error("receive failed", err)),
        }
    }

    fn finish_input(&self) -> SessionEnd {
        debug!("console input closed");
        if let Err(err) = self.channel.close() {
            warn!(error = %err, "closing channel failed");
        }
        SessionEnd::InputClosed
    }

    // A locally closed channel means an interrupter got there first.
    fn closed_end(&self) -> SessionEnd {
        if self.channel.is_closed() {
            SessionEnd::Interrupted
        } else {
            SessionEnd::PeerDisconnected
        }
    }
}

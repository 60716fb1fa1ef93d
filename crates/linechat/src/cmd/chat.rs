use std::io::{self, BufReader, IsTerminal};
use std::sync::Arc;

use linechat_line::LineConfig;
use linechat_peer::Peer;

use crate::cmd::{parse_duration, ChatArgs};
use crate::console::Console;
use crate::exit::{CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::OutputFormat;
use crate::session::{Mode, Session, SessionOptions, Turn};

impl ChatArgs {
    pub fn line_config(&self) -> CliResult<LineConfig> {
        let read_timeout = self.read_timeout.as_deref().map(parse_duration).transpose()?;
        Ok(LineConfig {
            max_line_length: self.max_line_length,
            strict: self.strict,
            read_timeout,
            ..LineConfig::default()
        })
    }

    fn mode(&self, first: Turn) -> Mode {
        if self.duplex {
            Mode::Duplex
        } else {
            Mode::Turns(first)
        }
    }
}

/// Chat over an established peer on stdin/stdout until either side stops.
pub fn run_chat(
    peer: Peer,
    args: &ChatArgs,
    first: Turn,
    prompt: &str,
    peer_label: String,
    format: OutputFormat,
) -> CliResult<i32> {
    let channel = Arc::new(peer.into_channel());
    let session = Session::new(
        channel,
        SessionOptions {
            mode: args.mode(first),
            format,
            peer_label,
        },
    );

    let interrupter = session.interrupter();
    ctrlc::set_handler(move || {
        tracing::info!("interrupted; closing connection");
        interrupter.interrupt();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))?;

    let show_prompt = !args.no_prompt && !args.duplex && io::stdin().is_terminal();
    let console = Console::new(
        BufReader::new(io::stdin()),
        io::stderr(),
        show_prompt.then(|| prompt.to_string()),
    );
    session.spawn_console(console);

    let mut out = io::stdout().lock();
    let end = session.run(&mut out)?;
    tracing::info!(?end, "chat ended");
    Ok(SUCCESS)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn chat_args() -> ChatArgs {
        ChatArgs {
            duplex: false,
            strict: true,
            max_line_length: 128,
            read_timeout: Some("250ms".to_string()),
            no_prompt: false,
        }
    }

    #[test]
    fn line_config_from_args() {
        let cfg = chat_args().line_config().unwrap();
        assert!(cfg.strict);
        assert_eq!(cfg.max_line_length, 128);
        assert_eq!(cfg.read_timeout, Some(Duration::from_millis(250)));
        assert_eq!(cfg.write_timeout, None);
    }

    #[test]
    fn bad_timeout_is_usage_error() {
        let args = ChatArgs {
            read_timeout: Some("soon".to_string()),
            ..chat_args()
        };
        let err = args.line_config().unwrap_err();
        assert_eq!(err.code, crate::exit::USAGE);
    }

    #[test]
    fn duplex_flag_overrides_turn_order() {
        assert_eq!(chat_args().mode(Turn::Receive), Mode::Turns(Turn::Receive));
        let args = ChatArgs {
            duplex: true,
            ..chat_args()
        };
        assert_eq!(args.mode(Turn::Send), Mode::Duplex);
    }
}

use linechat_peer::{connect_with_config, PeerConfig};

use crate::cmd::chat::run_chat;
use crate::cmd::{parse_duration, with_default_port, ConnectArgs};
use crate::exit::{peer_error, CliResult};
use crate::output::OutputFormat;
use crate::session::Turn;

pub fn run(args: ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let config = PeerConfig {
        line: args.chat.line_config()?,
        connect_timeout: args
            .connect_timeout
            .as_deref()
            .map(parse_duration)
            .transpose()?,
        ..PeerConfig::default()
    };

    let addr = with_default_port(&args.addr);
    let peer =
        connect_with_config(&addr, &config).map_err(|err| peer_error("connect failed", err))?;

    run_chat(peer, &args.chat, Turn::Send, "You: ", "Server".to_string(), format)
}

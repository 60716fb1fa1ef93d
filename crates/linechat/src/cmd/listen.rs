use linechat_peer::{PeerConfig, PeerListener};

use crate::cmd::chat::run_chat;
use crate::cmd::{with_default_port, ListenArgs};
use crate::exit::{peer_error, CliResult};
use crate::output::OutputFormat;
use crate::session::Turn;

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let config = PeerConfig {
        line: args.chat.line_config()?,
        ..PeerConfig::default()
    };

    let bind = with_default_port(&args.bind);
    let listener = PeerListener::bind(&bind)
        .map_err(|err| peer_error("bind failed", err))?
        .with_config(config);
    tracing::info!(local_addr = %listener.local_addr(), "server listening");

    let peer = listener
        .accept_one()
        .map_err(|err| peer_error("accept failed", err))?;
    tracing::info!(remote_addr = %peer.remote_addr(), "connected to {}", peer.remote_addr());

    let label = peer.remote_addr().ip().to_string();
    run_chat(peer, &args.chat, Turn::Receive, "Server: ", label, format)
}

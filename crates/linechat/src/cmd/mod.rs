use clap::{Args, Subcommand};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod chat;
pub mod connect;
pub mod listen;
pub mod version;

/// Chat port used when an address leaves it out.
pub const DEFAULT_PORT: u16 = 2006;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Listen for one peer and chat with it.
    Listen(ListenArgs),
    /// Dial a listening peer and chat with it.
    Connect(ConnectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args, format),
        Command::Connect(args) => connect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Options shared by every chatting subcommand.
#[derive(Args, Debug, Clone)]
pub struct ChatArgs {
    /// Free duplex: print incoming lines as they arrive instead of taking turns.
    #[arg(long, env = "LINECHAT_DUPLEX")]
    pub duplex: bool,
    /// Reject outgoing lines that would contain a newline.
    #[arg(long)]
    pub strict: bool,
    /// Maximum line length in bytes.
    #[arg(long, value_name = "BYTES", default_value_t = linechat_line::DEFAULT_MAX_LINE_LENGTH)]
    pub max_line_length: usize,
    /// Give up on a silent peer after this long (e.g. 30s, 500ms).
    #[arg(long, value_name = "DURATION", env = "LINECHAT_READ_TIMEOUT")]
    pub read_timeout: Option<String>,
    /// Do not print the input prompt.
    #[arg(long)]
    pub no_prompt: bool,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Address to bind.
    #[arg(long, short = 'b', env = "LINECHAT_BIND", default_value = "0.0.0.0:2006")]
    pub bind: String,
    #[command(flatten)]
    pub chat: ChatArgs,
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Address of the listening peer (`host:port`, or `host` for port 2006).
    #[arg(env = "LINECHAT_ADDR", default_value = "127.0.0.1:2006")]
    pub addr: String,
    /// Maximum time to wait for the connection (e.g. 5s, 500ms).
    #[arg(long, value_name = "DURATION")]
    pub connect_timeout: Option<String>,
    #[command(flatten)]
    pub chat: ChatArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<std::time::Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(std::time::Duration::from_millis(value)),
        _ => Ok(std::time::Duration::from_secs(value)),
    }
}

/// Append the default port when only a host was given.
pub fn with_default_port(addr: &str) -> String {
    let has_port = match addr.rsplit_once(':') {
        // A bare IPv6 literal has colons but no port.
        Some((host, port)) => {
            port.parse::<u16>().is_ok() && (!host.contains(':') || host.ends_with(']'))
        }
        None => false,
    };
    if has_port {
        addr.to_string()
    } else if addr.contains(':') && !addr.starts_with('[') {
        format!("[{addr}]:{DEFAULT_PORT}")
    } else {
        format!("{addr}:{DEFAULT_PORT}")
    }
}

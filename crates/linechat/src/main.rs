mod cmd;
mod console;
mod exit;
mod logging;
mod output;
mod session;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "linechat", version, about = "Line-oriented TCP chat")]
struct Cli {
    /// Format for received lines on stdout.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_listen_subcommand() {
        let cli = Cli::try_parse_from(["linechat", "listen", "--bind", "127.0.0.1:7000", "--duplex"])
            .expect("listen args should parse");

        match cli.command {
            Command::Listen(args) => {
                assert_eq!(args.bind, "127.0.0.1:7000");
                assert!(args.chat.duplex);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_connect_subcommand() {
        let cli = Cli::try_parse_from([
            "linechat",
            "--format",
            "raw",
            "connect",
            "10.0.0.5",
            "--connect-timeout",
            "3s",
            "--strict",
        ])
        .expect("connect args should parse");

        assert_eq!(cli.format, Some(OutputFormat::Raw));
        match cli.command {
            Command::Connect(args) => {
                assert_eq!(args.addr, "10.0.0.5");
                assert_eq!(args.connect_timeout.as_deref(), Some("3s"));
                assert!(args.chat.strict);
                assert!(!args.chat.duplex);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_format() {
        let err = Cli::try_parse_from(["linechat", "--format", "xml", "version"])
            .expect_err("unknown format should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}

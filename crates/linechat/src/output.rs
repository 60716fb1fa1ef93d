use std::io::{self, IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct LineOutput<'a> {
    event: &'a str,
    peer: &'a str,
    line: &'a str,
    bytes: usize,
    timestamp: String,
}

/// Print one received line.
pub fn print_line(out: &mut impl Write, peer: &str, line: &str, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let record = LineOutput {
                event: "line",
                peer,
                line,
                bytes: line.len(),
                timestamp: now_unix_seconds(),
            };
            let json = serde_json::to_string(&record).unwrap_or_else(|_| "{}".to_string());
            writeln!(out, "{json}")?;
        }
        OutputFormat::Pretty => writeln!(out, "{peer}: {line}")?,
        OutputFormat::Raw => writeln!(out, "{line}")?,
    }
    out.flush()
}

/// Print that the peer went away.
pub fn print_disconnected(out: &mut impl Write, peer: &str, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let record = serde_json::json!({
                "event": "disconnected",
                "peer": peer,
                "timestamp": now_unix_seconds(),
            });
            writeln!(out, "{record}")?;
        }
        OutputFormat::Pretty => writeln!(out, "{peer} disconnected")?,
        OutputFormat::Raw => {}
    }
    out.flush()
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(format: OutputFormat) -> String {
        let mut out = Vec::new();
        print_line(&mut out, "10.0.0.2", "hi there", format).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn pretty_prefixes_peer() {
        assert_eq!(render(OutputFormat::Pretty), "10.0.0.2: hi there\n");
    }

    #[test]
    fn raw_is_just_the_line() {
        assert_eq!(render(OutputFormat::Raw), "hi there\n");
    }

    #[test]
    fn json_carries_fields() {
        let rendered = render(OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(rendered.trim_end()).unwrap();
        assert_eq!(value["event"], "line");
        assert_eq!(value["peer"], "10.0.0.2");
        assert_eq!(value["line"], "hi there");
        assert_eq!(value["bytes"], 8);
    }

    #[test]
    fn disconnect_notice() {
        let mut out = Vec::new();
        print_disconnected(&mut out, "server", OutputFormat::Pretty).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "server disconnected\n");

        let mut out = Vec::new();
        print_disconnected(&mut out, "server", OutputFormat::Raw).unwrap();
        assert!(out.is_empty());
    }
}

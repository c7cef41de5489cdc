//! Structured JSON-lines logger
//!
//! One dashboard event per line. The `event` key always comes first,
//! `severity` second, and the remaining fields are sorted by key, so
//! identical events always render identical lines. Writes are
//! synchronous and unbuffered.
//!
//! `ERRLENS_LOG` sets the minimum severity that reaches the streams
//! (`debug`, `info`, `warn`, `error`); unset or unparsable means
//! `info`. Errors go to stderr, everything else to stdout.

use std::fmt;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::OnceLock;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Diagnostic detail
    Debug = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    fn parse(raw: &str) -> Option<Severity> {
        match raw.to_ascii_lowercase().as_str() {
            "debug" => Some(Severity::Debug),
            "info" => Some(Severity::Info),
            "warn" => Some(Severity::Warn),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static THRESHOLD: OnceLock<Severity> = OnceLock::new();

/// The minimum severity that gets written, read from `ERRLENS_LOG`
/// once per process.
fn threshold() -> Severity {
    *THRESHOLD.get_or_init(|| {
        std::env::var("ERRLENS_LOG")
            .ok()
            .and_then(|raw| Severity::parse(&raw))
            .unwrap_or(Severity::Info)
    })
}

/// Renders one log line: `{"event":...,"severity":...,<sorted fields>}\n`.
fn render_line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut line = String::with_capacity(64 + event.len());
    line.push_str("{\"event\":\"");
    push_escaped(&mut line, event);
    line.push_str("\",\"severity\":\"");
    line.push_str(severity.as_str());
    line.push('"');

    let mut ordered = fields.to_vec();
    ordered.sort_unstable_by_key(|&(key, _)| key);
    for (key, value) in ordered {
        line.push_str(",\"");
        push_escaped(&mut line, key);
        line.push_str("\":\"");
        push_escaped(&mut line, value);
        line.push('"');
    }

    line.push_str("}\n");
    line
}

fn push_escaped(out: &mut String, raw: &str) {
    for ch in raw.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch.is_control() => {
                let _ = write!(out, "\\u{:04x}", ch as u32);
            }
            ch => out.push(ch),
        }
    }
}

/// The process-wide logger. Stateless; every call renders and writes
/// one complete line.
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields. Lines below the
    /// `ERRLENS_LOG` threshold are dropped.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if severity < threshold() {
            return;
        }
        let line = render_line(severity, event, fields);
        if severity == Severity::Error {
            let mut stderr = io::stderr();
            let _ = stderr.write_all(line.as_bytes());
            let _ = stderr.flush();
        } else {
            let mut stdout = io::stdout();
            let _ = stdout.write_all(line.as_bytes());
            let _ = stdout.flush();
        }
    }

    pub fn debug(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Debug, event, fields);
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }
}

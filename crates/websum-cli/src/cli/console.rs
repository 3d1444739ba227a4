//! Terminal rendering of pipeline events.

use std::io::{self, Write};
use websum_core::observer::Observer;

pub(crate) const RULE_WIDTH: usize = 72;

/// Writes steps as rules and results in green on stdout. Errors (red) and
/// the URL progress line both go to stderr.
/// Colors are dropped when `NO_COLOR` is set.
pub struct ConsoleObserver {
    color: bool,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self {
            color: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new()
    }
}

/// `── message ───…` padded to a fixed width.
pub(crate) fn rule(message: &str) -> String {
    let used = message.chars().count() + 4;
    let tail = RULE_WIDTH.saturating_sub(used).max(2);
    format!("── {} {}", message, "─".repeat(tail))
}

/// `\r  Processing URLs d/t`, ending the line once the last URL is done.
pub(crate) fn write_progress(out: &mut impl Write, done: usize, total: usize) -> io::Result<()> {
    write!(out, "\r  Processing URLs {}/{}", done, total)?;
    if done >= total {
        writeln!(out)?;
    }
    out.flush()
}

impl Observer for ConsoleObserver {
    fn step(&mut self, message: &str) {
        tracing::info!("step: {}", message);
        println!("{}", self.paint("1;34", &rule(message)));
    }

    fn result(&mut self, message: &str) {
        tracing::info!("result: {} bytes", message.len());
        println!("{} {}", self.paint("1;32", "Result:"), message);
    }

    fn error(&mut self, message: &str) {
        tracing::error!("{}", message);
        eprintln!("{} {}", self.paint("1;31", "Error:"), self.paint("31", message));
    }

    fn progress(&mut self, done: usize, total: usize) {
        let _ = write_progress(&mut io::stderr().lock(), done, total);
    }
}

//! # Informational console lines.
//!
//! The fatal path prints three fixed lines. [`Console`] is where they go;
//! [`StdoutConsole`] is the default, [`StderrConsole`] keeps them off the
//! protocol channel.

use std::io::Write;
use std::sync::Arc;

use crate::config::ConsoleTarget;

/// Final line printed before the parent is signalled.
pub const KILL_ANNOUNCEMENT: &str = "Killing supervisor";

/// Sink for human-readable progress lines.
pub trait Console: Send + Sync {
    /// Writes one line (a trailing newline is added).
    fn line(&self, text: &str);
}

/// Writes lines to stdout and flushes each one.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn line(&self, text: &str) {
        if let Err(e) = write_line(&mut std::io::stdout().lock(), text) {
            tracing::warn!(stream = "stdout", line = text, "failed to write console line: {e}");
        }
    }
}

/// Writes lines to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrConsole;

impl Console for StderrConsole {
    fn line(&self, text: &str) {
        if let Err(e) = write_line(&mut std::io::stderr().lock(), text) {
            tracing::warn!(stream = "stderr", line = text, "failed to write console line: {e}");
        }
    }
}

fn write_line(out: &mut impl Write, text: &str) -> std::io::Result<()> {
    writeln!(out, "{text}")?;
    out.flush()
}

/// Returns the console matching a configured target.
pub fn for_target(target: ConsoleTarget) -> Arc<dyn Console> {
    match target {
        ConsoleTarget::Stdout => Arc::new(StdoutConsole),
        ConsoleTarget::Stderr => Arc::new(StderrConsole),
    }
}

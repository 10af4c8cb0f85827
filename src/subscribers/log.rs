//! # LogWriter: events as tracing records
//!
//! Renders each [`Event`] as a `tracing` record under the `fatalvisor::events`
//! target. Failures are logged at `warn`, the fatal path at `info`, routine
//! intake at `debug`.
//!
//! ## Example output
//! ```text
//! DEBUG fatalvisor::events: event received eventname="TICK_5" serial="21"
//!  INFO fatalvisor::events: fatal state observed process="ibgateway" group="ibgateway"
//!  INFO fatalvisor::events: cleanup started step=reap_temp cmd="tmpreaper --all ..."
//!  WARN fatalvisor::events: cleanup failed (ignored) step=purge_logs reason="exit code 1: ..."
//!  INFO fatalvisor::events: parent signaled pid=1
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

const TARGET: &str = "fatalvisor::events";

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let eventname = e.eventname.as_deref().unwrap_or("-");
        let step = e.step.map(|s| s.as_label()).unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::EventReceived => {
                let serial = e.serial.as_deref().unwrap_or("-");
                tracing::debug!(target: TARGET, seq = e.seq, eventname, serial, "event received");
            }
            EventKind::EventSkipped => {
                tracing::debug!(target: TARGET, seq = e.seq, eventname, "event skipped");
            }
            EventKind::FatalObserved => {
                let process = e.process.as_deref().unwrap_or("unknown");
                let group = e.group.as_deref().unwrap_or("unknown");
                tracing::info!(target: TARGET, seq = e.seq, process, group, "fatal state observed");
            }
            EventKind::CleanupStarted => {
                tracing::info!(target: TARGET, seq = e.seq, step, cmd = reason, "cleanup started");
            }
            EventKind::CleanupFinished => {
                tracing::info!(target: TARGET, seq = e.seq, step, "cleanup finished");
            }
            EventKind::CleanupFailed => {
                tracing::warn!(target: TARGET, seq = e.seq, step, reason, "cleanup failed (ignored)");
            }
            EventKind::ParentSignaled => {
                tracing::info!(target: TARGET, seq = e.seq, pid = e.pid.unwrap_or(-1), "parent signaled");
            }
            EventKind::ShutdownRequested => {
                tracing::info!(target: TARGET, seq = e.seq, "shutdown requested");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

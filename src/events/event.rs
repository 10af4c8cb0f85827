//! # Events emitted by the listener loop.
//!
//! The [`EventKind`] enum classifies what happened during an iteration:
//! - **Intake**: an event arrived and was acknowledged, or was skipped
//! - **Fatal path**: cleanup steps and the parent signal
//! - **Shutdown**: the listener itself was asked to stop
//!
//! Each [`Event`] carries a global monotonic `seq` and a wall-clock timestamp.
//!
//! ## Example
//! ```rust
//! use fatalvisor::{CleanupStep, Event, EventKind};
//!
//! let ev = Event::new(EventKind::CleanupFailed)
//!     .with_step(CleanupStep::PurgeLogs)
//!     .with_reason("exit code 1");
//!
//! assert_eq!(ev.kind, EventKind::CleanupFailed);
//! assert_eq!(ev.step, Some(CleanupStep::PurgeLogs));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::cleanup::CleanupStep;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of listener events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// An event was received and acknowledged.
    ///
    /// Sets: `eventname`, `serial`
    EventReceived,

    /// The event was not `PROCESS_STATE_FATAL`; nothing was done.
    ///
    /// Sets: `eventname`
    EventSkipped,

    /// A `PROCESS_STATE_FATAL` event arrived; the cleanup path starts.
    ///
    /// Sets: `process`, `group` (when the payload names them)
    FatalObserved,

    /// A cleanup command is about to run.
    ///
    /// Sets: `step`, `reason` (command line)
    CleanupStarted,

    /// A cleanup command exited successfully.
    ///
    /// Sets: `step`
    CleanupFinished,

    /// A cleanup command failed; the failure is ignored.
    ///
    /// Sets: `step`, `reason`
    CleanupFailed,

    /// `SIGTERM` was delivered to the parent.
    ///
    /// Sets: `pid`
    ParentSignaled,

    /// The listener received a termination signal and is stopping.
    ShutdownRequested,
}

impl EventKind {
    /// Short stable label (snake_case) for use in logs.
    pub fn as_label(self) -> &'static str {
        match self {
            EventKind::EventReceived => "event_received",
            EventKind::EventSkipped => "event_skipped",
            EventKind::FatalObserved => "fatal_observed",
            EventKind::CleanupStarted => "cleanup_started",
            EventKind::CleanupFinished => "cleanup_finished",
            EventKind::CleanupFailed => "cleanup_failed",
            EventKind::ParentSignaled => "parent_signaled",
            EventKind::ShutdownRequested => "shutdown_requested",
        }
    }
}

/// Listener event with optional metadata.
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Supervisor `eventname` header.
    pub eventname: Option<Arc<str>>,
    /// Supervisor `serial` header.
    pub serial: Option<Arc<str>>,
    /// Failed process name, from a `PROCESS_STATE_*` payload.
    pub process: Option<Arc<str>>,
    /// Failed process group, from a `PROCESS_STATE_*` payload.
    pub group: Option<Arc<str>>,
    /// Cleanup step, if applicable.
    pub step: Option<CleanupStep>,
    /// Signalled pid.
    pub pid: Option<i32>,
    /// Human-readable detail (command line, failure message).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            eventname: None,
            serial: None,
            process: None,
            group: None,
            step: None,
            pid: None,
            reason: None,
        }
    }

    /// Attaches the supervisor event name.
    #[inline]
    pub fn with_eventname(mut self, name: impl Into<Arc<str>>) -> Self {
        self.eventname = Some(name.into());
        self
    }

    /// Attaches the supervisor serial.
    #[inline]
    pub fn with_serial(mut self, serial: impl Into<Arc<str>>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    /// Attaches the failed process name.
    #[inline]
    pub fn with_process(mut self, process: impl Into<Arc<str>>) -> Self {
        self.process = Some(process.into());
        self
    }

    /// Attaches the failed process group.
    #[inline]
    pub fn with_group(mut self, group: impl Into<Arc<str>>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Attaches a cleanup step.
    #[inline]
    pub fn with_step(mut self, step: CleanupStep) -> Self {
        self.step = Some(step);
        self
    }

    /// Attaches a pid.
    #[inline]
    pub fn with_pid(mut self, pid: i32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

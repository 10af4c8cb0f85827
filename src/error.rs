//! Error types raised by the listener runtime.
//!
//! [`ListenerError`] covers everything that stops the event loop: transport
//! failures on the protocol channel, malformed frames, a failed signal to
//! the parent, and invalid configuration.
//!
//! Cleanup command failures are deliberately **not** represented here; they
//! are reported as a [`CommandOutcome`](crate::CommandOutcome) value that the
//! loop records and then ignores.

use thiserror::Error;

/// # Errors produced by the listener.
///
/// Every variant is fatal to [`Listener::run`](crate::Listener::run): the loop
/// returns it and the binary exits non-zero.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ListenerError {
    /// Reading from or writing to the protocol channel failed.
    #[error("i/o error while {context}: {source}")]
    Io {
        /// What the listener was doing when the error happened.
        context: &'static str,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The supervisor closed the protocol channel.
    #[error("protocol channel closed by supervisor")]
    Closed,

    /// A frame did not follow the event listener protocol.
    #[error("malformed protocol frame: {reason}")]
    Protocol {
        /// Description of what was wrong with the frame.
        reason: String,
    },

    /// Delivering SIGTERM to the parent process failed.
    #[error("failed to signal parent pid {pid}: {source}")]
    Signal {
        /// The parent pid that was targeted.
        pid: i32,
        /// The errno returned by `kill(2)`.
        #[source]
        source: nix::errno::Errno,
    },

    /// A configuration value could not be used.
    #[error("invalid configuration {key}: {reason}")]
    Config {
        /// The offending configuration key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ListenerError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use fatalvisor::ListenerError;
    ///
    /// assert_eq!(ListenerError::Closed.as_label(), "listener_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Io { .. } => "listener_io",
            ListenerError::Closed => "listener_closed",
            ListenerError::Protocol { .. } => "listener_protocol",
            ListenerError::Signal { .. } => "listener_signal",
            ListenerError::Config { .. } => "listener_config",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ListenerError::Io { context, source } => format!("io: {context}: {source}"),
            ListenerError::Closed => "channel closed".to_string(),
            ListenerError::Protocol { reason } => format!("protocol: {reason}"),
            ListenerError::Signal { pid, source } => format!("signal pid={pid}: {source}"),
            ListenerError::Config { key, reason } => format!("config {key}: {reason}"),
        }
    }

    /// Indicates whether the error came from the protocol channel itself.
    ///
    /// # Example
    /// ```
    /// use fatalvisor::ListenerError;
    ///
    /// assert!(ListenerError::Closed.is_transport());
    /// let bad = ListenerError::Config { key: "log_dir", reason: "empty".into() };
    /// assert!(!bad.is_transport());
    /// ```
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ListenerError::Io { .. } | ListenerError::Closed | ListenerError::Protocol { .. }
        )
    }

    pub(crate) fn protocol(reason: impl Into<String>) -> Self {
        ListenerError::Protocol {
            reason: reason.into(),
        }
    }

    pub(crate) fn io(context: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| ListenerError::Io { context, source }
    }
}

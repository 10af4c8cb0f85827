//! # Parent termination.
//!
//! [`Signaller`] is the seam through which the loop stops its supervisor.
//! [`ParentSignaller`] sends `SIGTERM` to `getppid()`, asking the supervisor
//! to shut down gracefully.

use nix::sys::signal::{kill, Signal};
use nix::unistd::getppid;

use crate::error::ListenerError;

/// Delivers the termination request to the owning supervisor.
pub trait Signaller: Send + Sync {
    /// Sends the termination signal and returns the pid it was sent to.
    fn terminate_parent(&self) -> Result<i32, ListenerError>;
}

/// Sends `SIGTERM` to the parent process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParentSignaller;

impl ParentSignaller {
    /// Construct a new [`ParentSignaller`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Signaller for ParentSignaller {
    fn terminate_parent(&self) -> Result<i32, ListenerError> {
        let parent = getppid();
        kill(parent, Signal::SIGTERM).map_err(|source| ListenerError::Signal {
            pid: parent.as_raw(),
            source,
        })?;
        Ok(parent.as_raw())
    }
}

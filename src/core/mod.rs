//! Listener core: the event loop and its assembly.
//!
//! Internal modules:
//! - [`listener`]: the loop itself (`step`, `run`, `run_until_shutdown`);
//! - [`builder`]: wires production seams and lets tests replace them;
//! - [`shutdown`]: termination signals delivered to the listener itself.

mod builder;
mod listener;
mod shutdown;

pub use builder::ListenerBuilder;
pub use listener::{CleanupReport, Listener, Outcome};

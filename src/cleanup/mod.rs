//! Best-effort cleanup commands run on the fatal path.
//!
//! - [`CleanupPlan`] the two commands, in execution order
//! - [`CleanupCommand`] program + arguments for one step
//! - [`CommandRunner`] execution seam, [`ProcessRunner`] its `tokio::process` implementation
//! - [`CommandOutcome`] result value the loop records and deliberately ignores

mod command;
mod runner;

pub use command::{CleanupCommand, CleanupPlan, CleanupStep};
pub use runner::{CommandOutcome, CommandRunner, ProcessRunner};

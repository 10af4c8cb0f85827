//! # fatalvisor
//!
//! **fatalvisor** is a supervisor event listener. It waits for one of the
//! supervised programs to enter the `FATAL` state (the supervisor gave up
//! restarting it), purges scratch space and log directories, and then asks
//! its own supervisor to shut down by sending it `SIGTERM`. In a container
//! whose entrypoint is the supervisor, that restarts the whole container
//! from a clean slate.
//!
//! ## Architecture
//! ```text
//!   supervisor (parent)
//!      │ stdin: header line + payload          ▲ stdout: READY / RESULT 2\nOK
//!      ▼                                       │
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Listener                                                     │
//! │  Transport ─► ack ─► eventname == PROCESS_STATE_FATAL ?      │
//! │                         │ no: skip      │ yes                │
//! │                         ▼               ▼                    │
//! │                      next event    Console + CommandRunner   │
//! │                                     (tmpreaper, find -delete)│
//! │                                         ▼                    │
//! │                                     Signaller (SIGTERM ppid) │
//! └───────────────┬──────────────────────────────────────────────┘
//!                 │ publish(Event)
//!                 ▼
//!               Bus ──► fan-out task ──► LogWriter (tracing) / custom
//! ```
//!
//! ## Features
//! | Area            | Description                                         | Key types                                 |
//! |-----------------|-----------------------------------------------------|-------------------------------------------|
//! | **Loop**        | One event per `step`, forever via `run`             | [`Listener`], [`Outcome`]                 |
//! | **Protocol**    | Framing, headers and acknowledgment tokens          | [`Transport`], [`Envelope`], [`Ack`]      |
//! | **Cleanup**     | Best-effort external commands                       | [`CleanupPlan`], [`CommandOutcome`]       |
//! | **Signals**     | Parent termination                                  | [`Signaller`], [`ParentSignaller`]        |
//! | **Events**      | Diagnostic event stream                             | [`Event`], [`Subscribe`], [`LogWriter`]   |
//! | **Config**      | Paths, programs and console target                  | [`Config`]                                |
//! | **Errors**      | Fatal loop errors                                   | [`ListenerError`]                         |
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use fatalvisor::{Config, Listener, LogWriter, Subscribe};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let listener = Listener::builder(Config::from_env()?)
//!         .with_subscribers(subs)
//!         .build();
//!     listener.run_until_shutdown().await?;
//!     Ok(())
//! }
//! ```

mod cleanup;
mod config;
mod console;
mod core;
mod error;
mod events;
mod protocol;
mod signals;
mod subscribers;

// ---- Public re-exports ----

pub use cleanup::{
    CleanupCommand, CleanupPlan, CleanupStep, CommandOutcome, CommandRunner, ProcessRunner,
};
pub use config::{Config, ConsoleTarget, ENV_PREFIX};
pub use console::{Console, StderrConsole, StdoutConsole, KILL_ANNOUNCEMENT};
pub use crate::core::{CleanupReport, Listener, ListenerBuilder, Outcome};
pub use error::ListenerError;
pub use events::{Bus, Event, EventKind};
pub use protocol::{
    Ack, Envelope, Headers, StdioTransport, Transport, FATAL_EVENT, READY_TOKEN,
};
pub use signals::{ParentSignaller, Signaller};
pub use subscribers::{LogWriter, Subscribe};

//! # Event subscribers.
//!
//! ```text
//!   Listener ── publish(Event) ──► Bus ──► fan-out task ──► on_event(), one subscriber at a time
//!                                                             │
//!                                                ┌────────────┼──────────┐
//!                                                ▼            ▼          ▼
//!                                            LogWriter     Custom       ...
//! ```
//!
//! - [`Subscribe`] extension point for event handlers
//! - [`LogWriter`] built-in subscriber rendering events as `tracing` records

mod fanout;
mod log;
mod subscribe;

pub(crate) use fanout::Fanout;
pub use log::LogWriter;
pub use subscribe::Subscribe;

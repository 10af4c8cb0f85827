//! Listener events: types and broadcast bus.
//!
//! The loop publishes an [`Event`] at every notable point of an iteration.
//! Events are purely diagnostic: nothing in the loop depends on who, if
//! anyone, consumes them.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

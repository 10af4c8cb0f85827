//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers into
//! the listener. Subscribers are attached for the duration of
//! [`Listener::run_until_shutdown`](crate::Listener::run_until_shutdown) and
//! called from a single fan-out task, in publish order.
//!
//! ## Contract
//! - Implementations may be slow; they delay other subscribers but never the event loop.
//! - A panic is caught and logged; the subscriber keeps receiving later events.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

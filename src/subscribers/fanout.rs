//! # Fan-out of bus events to subscribers.
//!
//! One task forwards every bus event to each subscriber in turn, awaiting
//! `on_event` before moving on. The listener is single-threaded, so there is
//! no per-subscriber queue: a slow subscriber delays the others but never the
//! event loop, which only publishes onto the bus.
//!
//! ## Rules
//! - Subscribers see events in publish order.
//! - A panicking subscriber is logged and skipped; the rest still run.
//! - After cancellation, events already on the bus are delivered before the task ends.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::Subscribe;
use crate::events::Event;

/// Ordered, panic-isolated delivery to a fixed set of subscribers.
pub(crate) struct Fanout {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl Fanout {
    pub(crate) fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subs }
    }

    /// Hands `event` to every subscriber, one after the other.
    pub(crate) async fn deliver(&self, event: &Event) {
        for sub in &self.subs {
            let fut = std::panic::AssertUnwindSafe(sub.on_event(event));
            if let Err(panic_err) = fut.catch_unwind().await {
                tracing::error!(
                    subscriber = sub.name(),
                    kind = event.kind.as_label(),
                    "subscriber panicked: {:?}",
                    panic_err
                );
            }
        }
    }

    /// Spawns the forwarding task; it stops once `token` is cancelled and the bus is drained.
    pub(crate) fn spawn(
        self,
        mut rx: broadcast::Receiver<Event>,
        token: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    msg = rx.recv() => match msg {
                        Ok(ev) => self.deliver(&ev).await,
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(skipped = n, "subscriber fan-out lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = token.cancelled() => break,
                }
            }
        })
    }
}

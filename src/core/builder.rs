use std::sync::Arc;

use super::listener::Listener;
use crate::{
    cleanup::{CleanupPlan, CommandRunner, ProcessRunner},
    config::Config,
    console::{self, Console},
    events::Bus,
    protocol::{StdioTransport, Transport},
    signals::{ParentSignaller, Signaller},
    subscribers::Subscribe,
};

/// Builder for a [`Listener`].
///
/// Every seam defaults to its production implementation:
/// - transport: [`StdioTransport::stdio`]
/// - runner: [`ProcessRunner`]
/// - signaller: [`ParentSignaller`]
/// - console: from [`Config::console`]
pub struct ListenerBuilder {
    cfg: Config,
    transport: Option<Box<dyn Transport>>,
    runner: Option<Arc<dyn CommandRunner>>,
    signaller: Option<Arc<dyn Signaller>>,
    console: Option<Arc<dyn Console>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ListenerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            transport: None,
            runner: None,
            signaller: None,
            console: None,
            subscribers: Vec::new(),
        }
    }

    /// Replaces the protocol transport.
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Replaces the cleanup command runner.
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Replaces the parent signaller.
    pub fn with_signaller(mut self, signaller: Arc<dyn Signaller>) -> Self {
        self.signaller = Some(signaller);
        self
    }

    /// Replaces the console.
    pub fn with_console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = Some(console);
        self
    }

    /// Sets event subscribers.
    ///
    /// Subscribers only receive events while [`Listener::run_until_shutdown`] drives the loop.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the listener.
    pub fn build(self) -> Listener {
        let plan = CleanupPlan::from_config(&self.cfg);
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        Listener::new_internal(
            self.transport
                .unwrap_or_else(|| Box::new(StdioTransport::stdio())),
            self.runner.unwrap_or_else(|| Arc::new(ProcessRunner::new())),
            self.signaller
                .unwrap_or_else(|| Arc::new(ParentSignaller::new())),
            self.console
                .unwrap_or_else(|| console::for_target(self.cfg.console)),
            plan,
            bus,
            self.subscribers,
        )
    }
}

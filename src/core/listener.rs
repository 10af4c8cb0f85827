//! # The event loop.
//!
//! ```text
//! loop {
//!   ├─► transport.recv()            (READY, then block for header + payload)
//!   ├─► transport.ack(Ok)           (exactly once, before anything else)
//!   ├─► eventname != PROCESS_STATE_FATAL ─► skip
//!   └─► fatal:
//!         ├─ console "Clearing out temp space"  ─► run tmpreaper   (outcome ignored)
//!         ├─ console "Emptying log directories" ─► run find -delete (outcome ignored)
//!         └─ console "Killing supervisor"       ─► SIGTERM parent
//! }
//! ```
//!
//! ## Rules
//! - Transport and signal errors end the loop; cleanup failures never do.
//! - Cleanup commands run sequentially and without timeout.
//! - Non-fatal events produce no console output, no command and no signal.

use std::convert::Infallible;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::builder::ListenerBuilder;
use super::shutdown::wait_for_shutdown_signal;
use crate::{
    cleanup::{CleanupPlan, CleanupStep, CommandOutcome, CommandRunner},
    config::Config,
    console::{Console, KILL_ANNOUNCEMENT},
    error::ListenerError,
    events::{Bus, Event, EventKind},
    protocol::{Ack, Envelope, Transport},
    signals::Signaller,
    subscribers::{Fanout, Subscribe},
};

/// What one iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The event was not fatal and was discarded.
    Skipped {
        /// The event's `eventname` header, if present.
        eventname: Option<String>,
    },
    /// The fatal path ran to completion.
    Handled(CleanupReport),
}

/// Record of one pass through the fatal path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    /// Each cleanup step with its (ignored) outcome, in execution order.
    pub outcomes: Vec<(CleanupStep, CommandOutcome)>,
    /// Pid that received `SIGTERM`.
    pub parent_pid: i32,
}

/// Supervisor event listener.
pub struct Listener {
    transport: Box<dyn Transport>,
    runner: Arc<dyn CommandRunner>,
    signaller: Arc<dyn Signaller>,
    console: Arc<dyn Console>,
    plan: CleanupPlan,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl Listener {
    /// Returns a builder with production defaults for every seam.
    pub fn builder(cfg: Config) -> ListenerBuilder {
        ListenerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        transport: Box<dyn Transport>,
        runner: Arc<dyn CommandRunner>,
        signaller: Arc<dyn Signaller>,
        console: Arc<dyn Console>,
        plan: CleanupPlan,
        bus: Bus,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        Self {
            transport,
            runner,
            signaller,
            console,
            plan,
            bus,
            subscribers,
        }
    }

    /// Bus carrying this listener's events.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Processes exactly one event.
    pub async fn step(&mut self) -> Result<Outcome, ListenerError> {
        let envelope = self.transport.recv().await?;
        self.transport.ack(Ack::Ok).await?;

        let mut received = Event::new(EventKind::EventReceived);
        if let Some(name) = envelope.eventname() {
            received = received.with_eventname(name);
        }
        if let Some(serial) = envelope.headers.get("serial") {
            received = received.with_serial(serial);
        }
        self.bus.publish(received);

        if !envelope.is_fatal() {
            let eventname = envelope.eventname().map(str::to_owned);
            let mut skipped = Event::new(EventKind::EventSkipped);
            if let Some(name) = &eventname {
                skipped = skipped.with_eventname(name.as_str());
            }
            self.bus.publish(skipped);
            return Ok(Outcome::Skipped { eventname });
        }

        self.handle_fatal(&envelope).await.map(Outcome::Handled)
    }

    async fn handle_fatal(&mut self, envelope: &Envelope) -> Result<CleanupReport, ListenerError> {
        let mut observed = Event::new(EventKind::FatalObserved).with_eventname(crate::FATAL_EVENT);
        if let Some(ph) = envelope.process_headers() {
            if let Some(name) = ph.get("processname") {
                observed = observed.with_process(name);
            }
            if let Some(group) = ph.get("groupname") {
                observed = observed.with_group(group);
            }
        }
        self.bus.publish(observed);

        let mut outcomes = Vec::with_capacity(self.plan.steps().len());
        for cmd in self.plan.steps() {
            self.console.line(cmd.step.announcement());
            self.bus.publish(
                Event::new(EventKind::CleanupStarted)
                    .with_step(cmd.step)
                    .with_reason(cmd.display()),
            );

            let outcome = self.runner.run(cmd).await;
            let ev = match outcome.detail() {
                None => Event::new(EventKind::CleanupFinished).with_step(cmd.step),
                Some(detail) => Event::new(EventKind::CleanupFailed)
                    .with_step(cmd.step)
                    .with_reason(format!("{}: {detail}", outcome.as_label())),
            };
            self.bus.publish(ev);
            outcomes.push((cmd.step, outcome));
        }

        self.console.line(KILL_ANNOUNCEMENT);
        let parent_pid = self.signaller.terminate_parent()?;
        self.bus
            .publish(Event::new(EventKind::ParentSignaled).with_pid(parent_pid));

        Ok(CleanupReport {
            outcomes,
            parent_pid,
        })
    }

    /// Runs the loop forever; returns only when a fatal error occurs.
    pub async fn run(&mut self) -> Result<Infallible, ListenerError> {
        loop {
            self.step().await?;
        }
    }

    /// Runs the loop until the listener receives SIGINT/SIGTERM/SIGQUIT.
    ///
    /// Subscribers are attached for the duration of the call and drained
    /// before it returns. Returns `Ok(())` on a termination signal and the
    /// loop's error otherwise.
    pub async fn run_until_shutdown(mut self) -> Result<(), ListenerError> {
        let token = CancellationToken::new();
        let fanout = Fanout::new(std::mem::take(&mut self.subscribers))
            .spawn(self.bus.subscribe(), token.clone());
        let bus = self.bus.clone();

        let res = tokio::select! {
            res = self.run() => match res {
                Ok(never) => match never {},
                Err(e) => Err(e),
            },
            sig = wait_for_shutdown_signal() => {
                sig.map_err(ListenerError::io("installing signal handlers"))
                    .map(|()| bus.publish(Event::new(EventKind::ShutdownRequested)))
            }
        };

        token.cancel();
        let _ = fanout.await;
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::CleanupCommand;
    use crate::protocol::{Headers, StdioTransport};
    use async_trait::async_trait;
    use serial_test::serial;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Ack,
        Line(String),
        Run(CleanupStep, String),
        Signal,
    }

    type Calls = Arc<Mutex<Vec<Call>>>;

    struct FakeTransport {
        queue: VecDeque<Envelope>,
        calls: Calls,
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn recv(&mut self) -> Result<Envelope, ListenerError> {
            self.queue.pop_front().ok_or(ListenerError::Closed)
        }

        async fn ack(&mut self, ack: Ack) -> Result<(), ListenerError> {
            assert_eq!(ack, Ack::Ok);
            self.calls.lock().unwrap().push(Call::Ack);
            Ok(())
        }
    }

    struct FakeRunner {
        calls: Calls,
        failing: Option<CleanupStep>,
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        async fn run(&self, cmd: &CleanupCommand) -> CommandOutcome {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Run(cmd.step, cmd.display()));
            if self.failing == Some(cmd.step) {
                CommandOutcome::Failed {
                    code: Some(1),
                    stderr: "permission denied".into(),
                }
            } else {
                CommandOutcome::Success
            }
        }
    }

    struct FakeSignaller {
        calls: Calls,
        fail: bool,
    }

    impl Signaller for FakeSignaller {
        fn terminate_parent(&self) -> Result<i32, ListenerError> {
            self.calls.lock().unwrap().push(Call::Signal);
            if self.fail {
                return Err(ListenerError::Signal {
                    pid: 4242,
                    source: nix::errno::Errno::ESRCH,
                });
            }
            Ok(4242)
        }
    }

    struct FakeConsole {
        calls: Calls,
    }

    impl Console for FakeConsole {
        fn line(&self, text: &str) {
            self.calls.lock().unwrap().push(Call::Line(text.to_string()));
        }
    }

    fn envelope(eventname: &str) -> Envelope {
        Envelope::new(
            Headers::parse(&format!("ver:3.0 serial:1 eventname:{eventname} len:0")).unwrap(),
            "",
        )
    }

    fn builder(calls: &Calls, failing: Option<CleanupStep>, signal_fails: bool) -> ListenerBuilder {
        Listener::builder(Config::default())
            .with_runner(Arc::new(FakeRunner {
                calls: calls.clone(),
                failing,
            }))
            .with_signaller(Arc::new(FakeSignaller {
                calls: calls.clone(),
                fail: signal_fails,
            }))
            .with_console(Arc::new(FakeConsole {
                calls: calls.clone(),
            }))
    }

    fn listener(events: Vec<Envelope>, failing: Option<CleanupStep>) -> (Listener, Calls) {
        let calls = Calls::default();
        let l = builder(&calls, failing, false)
            .with_transport(FakeTransport {
                queue: events.into(),
                calls: calls.clone(),
            })
            .build();
        (l, calls)
    }

    fn expected_fatal_calls() -> Vec<Call> {
        vec![
            Call::Ack,
            Call::Line("Clearing out temp space".into()),
            Call::Run(
                CleanupStep::ReapTemp,
                "tmpreaper --all --showdeleted --force 1h /tmp".into(),
            ),
            Call::Line("Emptying log directories".into()),
            Call::Run(
                CleanupStep::PurgeLogs,
                r"find ./myfolder -mindepth 1 ! -regex '^/root/Jts/ibgateway\(/.*\)?' -delete".into(),
            ),
            Call::Line("Killing supervisor".into()),
            Call::Signal,
        ]
    }

    #[tokio::test]
    async fn non_fatal_event_is_acknowledged_and_skipped() {
        let (mut l, calls) = listener(vec![envelope("PROCESS_COMMUNICATION_STDOUT")], None);

        let outcome = l.step().await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Skipped {
                eventname: Some("PROCESS_COMMUNICATION_STDOUT".into())
            }
        );
        assert_eq!(*calls.lock().unwrap(), [Call::Ack]);
    }

    #[tokio::test]
    async fn fatal_event_cleans_up_then_signals_parent() {
        let (mut l, calls) = listener(vec![envelope("PROCESS_STATE_FATAL")], None);

        let outcome = l.step().await.unwrap();
        let Outcome::Handled(report) = outcome else {
            panic!("expected fatal path");
        };
        assert_eq!(report.parent_pid, 4242);
        assert_eq!(report.outcomes.len(), 2);
        assert!(report.outcomes.iter().all(|(_, o)| o.is_success()));
        assert_eq!(*calls.lock().unwrap(), expected_fatal_calls());
    }

    #[tokio::test]
    async fn eventname_match_is_case_sensitive() {
        let (mut l, calls) = listener(vec![envelope("process_state_fatal")], None);
        assert!(matches!(l.step().await.unwrap(), Outcome::Skipped { .. }));
        assert_eq!(*calls.lock().unwrap(), [Call::Ack]);
    }

    #[tokio::test]
    async fn failing_cleanup_still_signals_parent() {
        let (mut l, calls) = listener(
            vec![envelope("PROCESS_STATE_FATAL")],
            Some(CleanupStep::ReapTemp),
        );

        let Outcome::Handled(report) = l.step().await.unwrap() else {
            panic!("expected fatal path");
        };
        assert_eq!(report.outcomes[0].0, CleanupStep::ReapTemp);
        assert!(!report.outcomes[0].1.is_success());
        assert!(report.outcomes[1].1.is_success());
        assert_eq!(*calls.lock().unwrap(), expected_fatal_calls());
    }

    #[tokio::test]
    async fn signal_failure_is_fatal() {
        let calls = Calls::default();
        let mut l = builder(&calls, None, true)
            .with_transport(FakeTransport {
                queue: vec![envelope("PROCESS_STATE_FATAL")].into(),
                calls: calls.clone(),
            })
            .build();

        let err = l.step().await.unwrap_err();
        assert_eq!(err.as_label(), "listener_signal");
    }

    #[tokio::test]
    async fn run_keeps_going_until_transport_fails() {
        let events = vec![
            envelope("TICK_5"),
            envelope("PROCESS_STATE_RUNNING"),
            envelope("PROCESS_STATE_FATAL"),
            envelope("TICK_60"),
        ];
        let (mut l, calls) = listener(events, None);

        let err = l.run().await.unwrap_err();
        assert!(matches!(err, ListenerError::Closed));

        let calls = calls.lock().unwrap();
        let acks = calls.iter().filter(|c| **c == Call::Ack).count();
        let signals = calls.iter().filter(|c| **c == Call::Signal).count();
        assert_eq!(acks, 4);
        assert_eq!(signals, 1);
    }

    #[tokio::test]
    async fn publishes_fatal_path_events_in_order() {
        let mut env = envelope("PROCESS_STATE_FATAL");
        env.payload = "processname:ibgateway groupname:gw from_state:BACKOFF".into();
        let (mut l, _calls) = listener(vec![env], Some(CleanupStep::PurgeLogs));
        let mut rx = l.bus().subscribe();

        l.step().await.unwrap();

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::FatalObserved {
                assert_eq!(ev.process.as_deref(), Some("ibgateway"));
                assert_eq!(ev.group.as_deref(), Some("gw"));
            }
            kinds.push(ev.kind);
        }
        assert_eq!(
            kinds,
            [
                EventKind::EventReceived,
                EventKind::FatalObserved,
                EventKind::CleanupStarted,
                EventKind::CleanupFinished,
                EventKind::CleanupStarted,
                EventKind::CleanupFailed,
                EventKind::ParentSignaled,
            ]
        );
    }

    #[tokio::test]
    async fn stdio_transport_end_to_end() {
        let input: &'static [u8] = b"ver:3.0 server:supervisor serial:21 pool:listener poolserial:10 eventname:PROCESS_COMMUNICATION_STDOUT len:5\nhello\
ver:3.0 server:supervisor serial:22 pool:listener poolserial:11 eventname:PROCESS_STATE_FATAL len:57\nprocessname:cat groupname:cat from_state:BACKOFF pid:2766";
        let calls = Calls::default();
        let mut l = builder(&calls, None, false)
            .with_transport(StdioTransport::new(input, Vec::new()))
            .build();

        assert!(matches!(l.step().await.unwrap(), Outcome::Skipped { .. }));
        assert!(matches!(l.step().await.unwrap(), Outcome::Handled(_)));
        assert!(matches!(l.step().await, Err(ListenerError::Closed)));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.iter().filter(|c| **c == Call::Signal).count(), 1);
        assert_eq!(
            calls.iter().filter(|c| matches!(c, Call::Run(..))).count(),
            2
        );
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }
    }

    /// Never delivers an event; reports when the loop starts waiting.
    struct IdleTransport {
        waiting: Arc<Notify>,
    }

    #[async_trait]
    impl Transport for IdleTransport {
        async fn recv(&mut self) -> Result<Envelope, ListenerError> {
            self.waiting.notify_one();
            std::future::pending().await
        }

        async fn ack(&mut self, _ack: Ack) -> Result<(), ListenerError> {
            Ok(())
        }
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn run_until_shutdown_future_is_send() {
        let calls = Calls::default();
        let l = builder(&calls, None, false)
            .with_transport(FakeTransport {
                queue: VecDeque::new(),
                calls: calls.clone(),
            })
            .build();
        let fut = l.run_until_shutdown();
        assert_send(&fut);
    }

    #[tokio::test]
    #[serial]
    async fn termination_signal_stops_loop_and_drains_subscribers() {
        use nix::sys::signal::{kill, Signal};
        use tokio::signal::unix::{signal, SignalKind};

        // Replaces the default SIGTERM action for the test binary.
        let _sigterm = signal(SignalKind::terminate()).unwrap();

        let calls = Calls::default();
        let rec = Arc::new(Recorder::default());
        let waiting = Arc::new(Notify::new());
        let l = builder(&calls, None, false)
            .with_transport(IdleTransport {
                waiting: waiting.clone(),
            })
            .with_subscribers(vec![rec.clone() as Arc<dyn Subscribe>])
            .build();

        let (res, ()) = tokio::join!(l.run_until_shutdown(), async {
            waiting.notified().await;
            kill(nix::unistd::getpid(), Signal::SIGTERM).unwrap();
        });

        assert!(res.is_ok());
        assert_eq!(*rec.seen.lock().unwrap(), [EventKind::ShutdownRequested]);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn subscribers_see_fatal_path_before_closed_is_returned() {
        let calls = Calls::default();
        let rec = Arc::new(Recorder::default());
        let l = builder(&calls, Some(CleanupStep::PurgeLogs), false)
            .with_transport(FakeTransport {
                queue: vec![envelope("TICK_5"), envelope("PROCESS_STATE_FATAL")].into(),
                calls: calls.clone(),
            })
            .with_subscribers(vec![rec.clone() as Arc<dyn Subscribe>])
            .build();

        let res = l.run_until_shutdown().await;

        assert!(matches!(res, Err(ListenerError::Closed)));
        assert_eq!(
            *rec.seen.lock().unwrap(),
            [
                EventKind::EventReceived,
                EventKind::EventSkipped,
                EventKind::EventReceived,
                EventKind::FatalObserved,
                EventKind::CleanupStarted,
                EventKind::CleanupFinished,
                EventKind::CleanupStarted,
                EventKind::CleanupFailed,
                EventKind::ParentSignaled,
            ]
        );
    }

    #[tokio::test]
    async fn failed_cleanup_event_carries_outcome_label() {
        let (mut l, _calls) = listener(
            vec![envelope("PROCESS_STATE_FATAL")],
            Some(CleanupStep::ReapTemp),
        );
        let mut rx = l.bus().subscribe();

        l.step().await.unwrap();

        let failed = std::iter::from_fn(|| rx.try_recv().ok())
            .find(|ev| ev.kind == EventKind::CleanupFailed)
            .unwrap();
        assert_eq!(failed.step, Some(CleanupStep::ReapTemp));
        assert_eq!(
            failed.reason.as_deref(),
            Some("failed: exit code 1: permission denied")
        );
    }
}

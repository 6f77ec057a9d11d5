//! # DisplayWorker: periodic display of one alarm.
//!
//! One worker runs per claimed message record. It only **reads** the record
//! (under the gate) and sleeps outside the gate, so neither the dispatcher nor
//! other workers are blocked while it waits.
//!
//! ## State machine
//! ```text
//! loop {
//!   ├─► runtime cancelled?            → exit silently (Shutdown)
//!   ├─► enter gate, observe(key)
//!   │     └─ record gone              → publish WorkerExiting, exit (Unlinked)
//!   ├─► leave gate
//!   ├─► revision changed?             → publish MessageChanged, ticks = 0
//!   ├─► ticks < interval?             → publish Tick, ticks += 1
//!   └─► sleep(interval * time_unit)   (woken early only by the wake token)
//! }
//! ```
//!
//! ## Rules
//! - The interval is re-read every iteration, so a supersede takes effect at the next sleep boundary.
//! - Once `interval` ticks were shown, later ticks are silent until the next supersede.
//! - Cancellation is cooperative: the worker notices removal at its next tick,
//!   or immediately if the dispatcher fires its wake token.

use std::sync::Arc;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use super::{
    config::Config,
    gate::Gate,
    registry::Registry,
    request::{AlarmId, RecordKey},
};
use crate::events::{Bus, Event, EventKind};

/// Why a display worker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerExit {
    /// Its record was removed from the registry.
    Unlinked,
    /// The runtime is shutting down.
    Shutdown,
}

/// Displays the message behind one record key until the record is removed.
pub(crate) struct DisplayWorker {
    key: RecordKey,
    id: AlarmId,
    /// Last text displayed; reported on exit.
    text: Arc<str>,
    registry: Arc<Gate<Registry>>,
    bus: Bus,
    cfg: Config,
}

impl DisplayWorker {
    /// Creates a worker for the record `key` (message number `id`, initial `text`).
    pub fn new(
        key: RecordKey,
        id: AlarmId,
        text: Arc<str>,
        registry: Arc<Gate<Registry>>,
        bus: Bus,
        cfg: Config,
    ) -> Self {
        Self {
            key,
            id,
            text,
            registry,
            bus,
            cfg,
        }
    }

    /// Runs the display loop.
    ///
    /// `wake` interrupts the current sleep; `runtime` stops the worker without an exit notice.
    pub async fn run(mut self, wake: CancellationToken, runtime: CancellationToken) -> WorkerExit {
        let mut ticks: u32 = 0;
        let mut seen_revision: u64 = 0;

        loop {
            if runtime.is_cancelled() {
                return WorkerExit::Shutdown;
            }

            let guard = self.registry.enter().await;
            let Some(obs) = guard.observe(self.key) else {
                self.bus.publish(
                    Event::new(EventKind::WorkerExiting)
                        .with_alarm(self.id)
                        .with_text(Arc::clone(&self.text)),
                );
                guard.leave();
                return WorkerExit::Unlinked;
            };
            guard.leave();

            self.text = Arc::clone(&obs.text);

            if obs.superseded && obs.revision != seen_revision {
                seen_revision = obs.revision;
                ticks = 0;
                self.publish(EventKind::MessageChanged, obs.interval);
            }

            if ticks < obs.interval {
                ticks += 1;
                self.publish(EventKind::Tick, obs.interval);
            }

            let sleep = time::sleep(self.cfg.period(obs.interval.max(1)));
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = wake.cancelled() => {}
            }
        }
    }

    fn publish(&self, kind: EventKind, interval: u32) {
        self.bus.publish(
            Event::new(kind)
                .with_alarm(self.id)
                .with_text(Arc::clone(&self.text))
                .with_interval(interval),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::InsertOutcome;
    use crate::core::request::AlarmRequest;
    use std::time::Duration;
    use tokio::sync::broadcast;

    async fn next_kind(rx: &mut broadcast::Receiver<Event>) -> (EventKind, String) {
        let ev = rx.recv().await.unwrap();
        (ev.kind, ev.text_or_empty().to_string())
    }

    async fn setup(interval: u32, text: &str) -> (Arc<Gate<Registry>>, RecordKey) {
        let gate = Arc::new(Gate::new(Registry::new()));
        let mut guard = gate.enter().await;
        let InsertOutcome::Added(key) = guard.insert(AlarmRequest::message(1, interval, text))
        else {
            panic!("expected Added");
        };
        guard.take_next_submitted();
        drop(guard);
        (gate, key)
    }

    #[tokio::test(start_paused = true)]
    async fn test_prints_interval_ticks_then_goes_silent() {
        let (gate, key) = setup(2, "hi").await;
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let worker = DisplayWorker::new(key, 1, "hi".into(), gate, bus, Config::default());
        let token = CancellationToken::new();
        tokio::spawn(worker.run(token.child_token(), token.clone()));

        assert_eq!(next_kind(&mut rx).await, (EventKind::Tick, "hi".into()));
        assert_eq!(next_kind(&mut rx).await, (EventKind::Tick, "hi".into()));
        assert!(
            time::timeout(Duration::from_secs(30), rx.recv())
                .await
                .is_err()
        );
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_exits_with_last_text_when_unlinked() {
        let (gate, key) = setup(4, "bye").await;
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let worker = DisplayWorker::new(
            key,
            1,
            "bye".into(),
            Arc::clone(&gate),
            bus,
            Config::default(),
        );
        let token = CancellationToken::new();
        let join = tokio::spawn(worker.run(token.child_token(), token.clone()));

        assert_eq!(next_kind(&mut rx).await.0, EventKind::Tick);
        gate.enter().await.remove(1);

        assert_eq!(
            next_kind(&mut rx).await,
            (EventKind::WorkerExiting, "bye".into())
        );
        assert_eq!(join.await.unwrap(), WorkerExit::Unlinked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runtime_cancel_stops_silently() {
        let (gate, key) = setup(60, "long").await;
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let worker = DisplayWorker::new(key, 1, "long".into(), gate, bus, Config::default());
        let token = CancellationToken::new();
        let join = tokio::spawn(worker.run(token.child_token(), token.clone()));

        assert_eq!(next_kind(&mut rx).await.0, EventKind::Tick);
        token.cancel();

        assert_eq!(join.await.unwrap(), WorkerExit::Shutdown);
        assert!(rx.try_recv().is_err());
    }
}

//! # Dispatcher: turns submissions into workers and removals.
//!
//! A single background task that claims newly submitted records from the
//! registry, one at a time, in id order.
//!
//! ## Architecture
//! ```text
//! Intake ── insert/cancel ──► Registry ── notify ──► Dispatcher::run()
//!                                                      ├─► Message → WorkerCreated, spawn DisplayWorker
//!                                                      └─► Cancel  → remove(id), Cancelled
//! ```
//!
//! ## Rules
//! - `take_next_submitted` is only ever called from here, so each submission is handled once.
//! - When nothing is pending the dispatcher parks on a [`Notify`]; there is no polling.
//! - Workers get the record key only; removal is done here, never by a worker.
//! - Finished workers are reaped as they exit; on shutdown every worker is cancelled and joined.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Notify;
use tokio::task::{self, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use super::{
    config::Config,
    gate::Gate,
    registry::{Registry, Submission},
    request::{AlarmId, RecordKey, RequestKind},
    worker::{DisplayWorker, WorkerExit},
};
use crate::events::{Bus, Event, EventKind};

/// Handle to a running display worker.
struct WorkerHandle {
    /// Message number the worker displays.
    id: AlarmId,
    /// Interrupts the worker's sleep (child of the runtime token).
    wake: CancellationToken,
    /// Tokio task id, used to match panics back to the handle.
    task: task::Id,
}

/// Single consumer of registry submissions.
pub(crate) struct Dispatcher {
    registry: Arc<Gate<Registry>>,
    bus: Bus,
    cfg: Config,
    submitted: Arc<Notify>,
    runtime_token: CancellationToken,
    workers: JoinSet<(RecordKey, WorkerExit)>,
    handles: HashMap<RecordKey, WorkerHandle>,
}

impl Dispatcher {
    /// Creates a new dispatcher.
    pub fn new(
        registry: Arc<Gate<Registry>>,
        bus: Bus,
        cfg: Config,
        submitted: Arc<Notify>,
        runtime_token: CancellationToken,
    ) -> Self {
        Self {
            registry,
            bus,
            cfg,
            submitted,
            runtime_token,
            workers: JoinSet::new(),
            handles: HashMap::new(),
        }
    }

    /// Runs until the runtime token is cancelled, then stops and joins all workers.
    pub async fn run(mut self) {
        loop {
            let next = self.registry.enter().await.take_next_submitted();
            if let Some(sub) = next {
                self.dispatch(sub).await;
                continue;
            }

            let reaped = tokio::select! {
                _ = self.runtime_token.cancelled() => break,
                _ = self.submitted.notified() => None,
                Some(res) = self.workers.join_next(), if !self.workers.is_empty() => Some(res),
            };
            if let Some(res) = reaped {
                self.reap(res);
            }
        }

        self.shutdown_workers().await;
    }

    /// Acts on one claimed submission.
    async fn dispatch(&mut self, sub: Submission) {
        match sub.kind {
            RequestKind::Message => self.spawn_worker(sub),
            RequestKind::Cancel => self.cancel(sub.id).await,
        }
    }

    /// Publishes `WorkerCreated` and spawns a display worker bound to the record key.
    fn spawn_worker(&mut self, sub: Submission) {
        self.bus.publish(
            Event::new(EventKind::WorkerCreated)
                .with_alarm(sub.id)
                .with_text(Arc::clone(&sub.text))
                .with_interval(sub.interval),
        );

        let worker = DisplayWorker::new(
            sub.key,
            sub.id,
            sub.text,
            Arc::clone(&self.registry),
            self.bus.clone(),
            self.cfg.clone(),
        );
        let wake = self.runtime_token.child_token();
        let runtime = self.runtime_token.clone();
        let key = sub.key;
        let wake_for_worker = wake.clone();
        let abort = self
            .workers
            .spawn(async move { (key, worker.run(wake_for_worker, runtime).await) });

        tracing::debug!(alarm = sub.id, ?key, "display worker spawned");
        self.handles.insert(
            key,
            WorkerHandle {
                id: sub.id,
                wake,
                task: abort.id(),
            },
        );
    }

    /// Removes the message for `id` and its cancel record, then publishes `Cancelled`.
    async fn cancel(&mut self, id: AlarmId) {
        let mut guard = self.registry.enter().await;
        let removal = guard.remove(id);
        let mut ev = Event::new(EventKind::Cancelled).with_alarm(id);
        if let Some(r) = &removal {
            ev = ev.with_text(Arc::clone(&r.text));
        }
        self.bus.publish(ev);
        guard.leave();

        let Some(removal) = removal else {
            tracing::debug!(alarm = id, "cancel processed with no message record");
            return;
        };
        if self.cfg.wake_on_cancel
            && let Some(handle) = self.handles.get(&removal.message)
        {
            handle.wake.cancel();
        }
    }

    /// Forgets the handle of a finished worker and reports panics.
    fn reap(&mut self, res: Result<(RecordKey, WorkerExit), JoinError>) {
        match res {
            Ok((key, exit)) => {
                if let Some(h) = self.handles.remove(&key) {
                    tracing::debug!(alarm = h.id, ?exit, "display worker finished");
                }
            }
            Err(je) => {
                let task = je.id();
                let alarm = self
                    .handles
                    .iter()
                    .find(|(_, h)| h.task == task)
                    .map(|(k, h)| (*k, h.id));
                if let Some((key, _)) = alarm {
                    self.handles.remove(&key);
                }
                if je.is_panic() {
                    tracing::error!(alarm = ?alarm.map(|(_, id)| id), "display worker panicked");
                }
            }
        }
    }

    /// Cancels every worker and waits for all of them to finish.
    async fn shutdown_workers(&mut self) {
        for h in self.handles.values() {
            h.wake.cancel();
        }
        while let Some(res) = self.workers.join_next().await {
            self.reap(res);
        }
    }

    /// Number of workers not yet reaped.
    #[cfg(test)]
    fn active_workers(&self) -> usize {
        self.handles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::request::AlarmRequest;
    use std::time::Duration;
    use tokio::time;

    fn fixture() -> (Dispatcher, Arc<Gate<Registry>>, Bus) {
        let gate = Arc::new(Gate::new(Registry::new()));
        let bus = Bus::new(64);
        let dispatcher = Dispatcher::new(
            Arc::clone(&gate),
            bus.clone(),
            Config {
                wake_on_cancel: true,
                ..Config::default()
            },
            Arc::new(Notify::new()),
            CancellationToken::new(),
        );
        (dispatcher, gate, bus)
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_spawns_one_worker() {
        let (mut d, gate, bus) = fixture();
        let mut rx = bus.subscribe();
        gate.enter().await.insert(AlarmRequest::message(1, 5, "A"));

        let sub = gate.enter().await.take_next_submitted().unwrap();
        d.dispatch(sub).await;

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::WorkerCreated);
        assert_eq!(ev.alarm, Some(1));
        assert_eq!(d.active_workers(), 1);

        d.runtime_token.cancel();
        d.shutdown_workers().await;
        assert_eq!(d.active_workers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_removes_and_wakes_worker() {
        let (mut d, gate, bus) = fixture();
        let mut rx = bus.subscribe();
        gate.enter().await.insert(AlarmRequest::message(3, 10, "X"));
        let sub = gate.enter().await.take_next_submitted().unwrap();
        d.dispatch(sub).await;

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::WorkerCreated);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::Tick);

        gate.enter().await.cancel(AlarmRequest::cancel(3));
        let sub = gate.enter().await.take_next_submitted().unwrap();
        d.dispatch(sub).await;

        let cancelled = rx.recv().await.unwrap();
        assert_eq!(cancelled.kind, EventKind::Cancelled);
        assert_eq!(cancelled.text_or_empty(), "X");
        assert!(gate.enter().await.is_empty());

        let started = time::Instant::now();
        let exiting = rx.recv().await.unwrap();
        assert_eq!(exiting.kind, EventKind::WorkerExiting);
        assert!(started.elapsed() < Duration::from_secs(1));

        let res = d.workers.join_next().await.unwrap();
        d.reap(res);
        assert_eq!(d.active_workers(), 0);
    }
}

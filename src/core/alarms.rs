//! # Alarms: the runtime handle intake talks to.
//!
//! [`Alarms`] owns the gated registry, the event bus, the dispatcher task and
//! the subscriber fan-out.
//!
//! ## Key responsibilities
//! - accept submissions (`submit_*`) and wake the dispatcher
//! - forward bus events to the [`SubscriberSet`]
//! - expose read-only registry snapshots
//! - shut everything down in order
//!
//! ## High-level architecture
//! ```text
//! Intake ──► Alarms::submit(Command)
//!              ├─► gate.enter() → Registry::insert / Registry::cancel
//!              └─► Notify::notify_one() ──► Dispatcher (spawn / remove)
//!                                              └─► DisplayWorker × N
//!
//! Event flow:
//!   Dispatcher / DisplayWorker ── publish ──► Bus ──► subscriber_listener ──► SubscriberSet
//!
//! Shutdown path:
//!   runtime_token.cancel() → dispatcher cancels + joins workers
//!   listener_token.cancel() → listener drains the bus, then SubscriberSet::shutdown()
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use alarmvisor::{Alarms, Config, ConsoleWriter};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let alarms = Alarms::builder(Config::default())
//!         .with_subscriber(Arc::new(ConsoleWriter::new()))
//!         .build();
//!
//!     alarms.submit_message(1, 5, "stretch").await?;
//!     alarms.submit_cancel(1).await?;
//!
//!     alarms.shutdown().await;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::{Mutex, Notify, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{
    builder::AlarmsBuilder,
    config::Config,
    gate::Gate,
    registry::{CancelOutcome, InsertOutcome, Registry},
    request::{AlarmId, AlarmRequest, RecordView, RequestKind},
};
use crate::{
    error::SubmitError,
    events::{Bus, Event},
    intake::Command,
    subscribers::SubscriberSet,
};

/// Subscribes to the bus and forwards events to the subscriber set.
///
/// After `token` fires, events already buffered in the bus are still delivered
/// before the set is shut down.
pub(super) fn spawn_subscriber_listener(
    bus: &Bus,
    set: SubscriberSet,
    token: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = bus.subscribe();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged");
                    }
                },
                _ = token.cancelled() => break,
            }
        }
        set.shutdown().await;
    })
}

/// Running alarm runtime.
pub struct Alarms {
    cfg: Config,
    bus: Bus,
    registry: Arc<Gate<Registry>>,
    submitted: Arc<Notify>,
    runtime_token: CancellationToken,
    listener_token: CancellationToken,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Alarms {
    /// Creates a builder for configuring the runtime.
    pub fn builder(cfg: Config) -> AlarmsBuilder {
        AlarmsBuilder::new(cfg)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn new_internal(
        cfg: Config,
        bus: Bus,
        registry: Arc<Gate<Registry>>,
        submitted: Arc<Notify>,
        runtime_token: CancellationToken,
        dispatcher: JoinHandle<()>,
        listener_token: CancellationToken,
        listener: JoinHandle<()>,
    ) -> Self {
        Self {
            cfg,
            bus,
            registry,
            submitted,
            runtime_token,
            listener_token,
            dispatcher: Mutex::new(Some(dispatcher)),
            listener: Mutex::new(Some(listener)),
        }
    }

    /// Returns the runtime configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Creates a receiver for every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Submits a parsed intake command.
    pub async fn submit(&self, cmd: Command) -> Result<(), SubmitError> {
        self.submit_request(cmd.into()).await
    }

    /// Submits `Message(id)`: display `text` every `interval` seconds.
    ///
    /// If a message with the same id is live, its text and interval are replaced in place.
    pub async fn submit_message(
        &self,
        id: AlarmId,
        interval: u32,
        text: &str,
    ) -> Result<(), SubmitError> {
        self.submit_request(AlarmRequest::message(id, interval, text))
            .await
    }

    /// Submits `Cancel: Message(id)`.
    ///
    /// Silently dropped if no message with that id is live or a cancel is already pending.
    pub async fn submit_cancel(&self, id: AlarmId) -> Result<(), SubmitError> {
        self.submit_request(AlarmRequest::cancel(id)).await
    }

    /// Submits a request built by the caller.
    pub async fn submit_request(&self, req: AlarmRequest) -> Result<(), SubmitError> {
        if self.runtime_token.is_cancelled() {
            return Err(SubmitError::Closed);
        }
        if req.kind == RequestKind::Message && req.interval == 0 {
            return Err(SubmitError::ZeroInterval);
        }

        let id = req.id;
        let mut guard = self.registry.enter().await;
        let wake = match req.kind {
            RequestKind::Message => match guard.insert(req) {
                InsertOutcome::Added(key) => {
                    tracing::debug!(alarm = id, ?key, "message added");
                    true
                }
                InsertOutcome::Superseded(key) => {
                    tracing::debug!(alarm = id, ?key, "message superseded");
                    false
                }
            },
            RequestKind::Cancel => match guard.cancel(req) {
                CancelOutcome::Queued(key) => {
                    tracing::debug!(alarm = id, ?key, "cancel queued");
                    true
                }
                CancelOutcome::NoSuchMessage => {
                    tracing::debug!(alarm = id, "cancel dropped: no such message");
                    false
                }
                CancelOutcome::AlreadyPending => {
                    tracing::debug!(alarm = id, "cancel dropped: already pending");
                    false
                }
            },
        };
        guard.leave();

        if wake {
            self.submitted.notify_one();
        }
        Ok(())
    }

    /// Returns an ordered copy of every registry record.
    pub async fn snapshot(&self) -> Vec<RecordView> {
        self.registry.enter().await.snapshot()
    }

    /// Returns true if a message with `id` is currently in the registry.
    pub async fn is_live(&self, id: AlarmId) -> bool {
        self.snapshot()
            .await
            .iter()
            .any(|v| v.id == id && v.kind == RequestKind::Message)
    }

    /// Returns true once [`shutdown`](Self::shutdown) has started.
    pub fn is_shut_down(&self) -> bool {
        self.runtime_token.is_cancelled()
    }

    /// Stops the dispatcher and every worker, then flushes subscribers.
    ///
    /// Workers stop without an exit notice. Calling this twice is harmless.
    pub async fn shutdown(&self) {
        self.runtime_token.cancel();

        if let Some(join) = self.dispatcher.lock().await.take()
            && let Err(je) = join.await
        {
            tracing::error!(error = %je, "dispatcher task failed");
        }

        self.listener_token.cancel();
        if let Some(join) = self.listener.lock().await.take()
            && let Err(je) = join.await
        {
            tracing::error!(error = %je, "subscriber listener failed");
        }
    }
}

use std::sync::Arc;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use super::{
    alarms::{Alarms, spawn_subscriber_listener},
    config::Config,
    dispatcher::Dispatcher,
    gate::Gate,
    registry::Registry,
};
use crate::{
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing an [`Alarms`] runtime.
pub struct AlarmsBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl AlarmsBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets notification subscribers, replacing any added before.
    ///
    /// Subscribers receive events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one notification subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds the runtime and starts its background tasks.
    ///
    /// Must be called from within a tokio runtime. Initializes:
    /// - Event bus and the subscriber fan-out
    /// - Gated registry
    /// - Dispatcher task
    pub fn build(self) -> Arc<Alarms> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let listener_token = CancellationToken::new();
        let listener = spawn_subscriber_listener(&bus, subs, listener_token.clone());

        let registry = Arc::new(Gate::new(Registry::new()));
        let submitted = Arc::new(Notify::new());
        let runtime_token = CancellationToken::new();

        let dispatcher = Dispatcher::new(
            Arc::clone(&registry),
            bus.clone(),
            self.cfg.clone(),
            Arc::clone(&submitted),
            runtime_token.clone(),
        );
        let dispatcher = tokio::spawn(dispatcher.run());

        Arc::new(Alarms::new_internal(
            self.cfg,
            bus,
            registry,
            submitted,
            runtime_token,
            dispatcher,
            listener_token,
            listener,
        ))
    }
}

//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish notifications emitted by the dispatcher, the display workers and
//! the subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Dispatcher`, `DisplayWorker`, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: `Alarms::subscriber_listener()` (fans out to `SubscriberSet`)
//!   and any receiver handed out by `Alarms::subscribe()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

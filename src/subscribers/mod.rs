//! # Notification subscribers for the alarm runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`ConsoleWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Dispatcher / DisplayWorker ── publish(Event) ──► Bus ──► SubscriberSet::emit(&Event)
//!                                                              │
//!                                                    ┌─────────┼─────────┐
//!                                                    ▼         ▼         ▼
//!                                              ConsoleWriter  Custom    ...
//! ```

mod embedded;
mod subscriber;
mod subscriber_set;

pub use embedded::ConsoleWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;

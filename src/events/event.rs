//! # Notifications emitted by the dispatcher and display workers.
//!
//! The [`EventKind`] enum classifies notifications in two groups:
//! - **Alarm events**: the status lines of the alarm lifecycle
//!   (worker created, tick, message changed, cancelled, worker exiting)
//! - **Subscriber events**: health of the fan-out pipeline (overflow, panic)
//!
//! The [`Event`] struct carries the alarm id, the text being displayed and the
//! interval, plus a timestamp and a global sequence number.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Events for the **same** alarm id are always published in lifecycle order;
//! events for different ids may interleave arbitrarily.
//!
//! ## Example
//! ```rust
//! use alarmvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::Tick)
//!     .with_alarm(7)
//!     .with_text("wake up")
//!     .with_interval(5);
//!
//! assert_eq!(ev.kind, EventKind::Tick);
//! assert_eq!(ev.alarm, Some(7));
//! assert_eq!(ev.text.as_deref(), Some("wake up"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::core::AlarmId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Alarm events ===
    /// The dispatcher claimed a new message request and spawned its worker.
    ///
    /// Sets: `alarm`, `text`, `interval`
    WorkerCreated,

    /// A worker displayed its message for one tick.
    ///
    /// Sets: `alarm`, `text`, `interval`
    Tick,

    /// A worker noticed its message was superseded (printed once per change).
    ///
    /// Sets: `alarm`, `text` (the new text), `interval` (the new interval)
    MessageChanged,

    /// The dispatcher processed a cancel and removed the alarm.
    ///
    /// Sets: `alarm`, `text` (the text of the removed message)
    Cancelled,

    /// A worker observed its record was removed and is terminating.
    ///
    /// Sets: `alarm`, `text` (the last text the worker displayed)
    WorkerExiting,

    // === Subscriber events ===
    /// A subscriber panicked while handling an event.
    ///
    /// Sets: `source` (subscriber name), `reason` (panic message)
    SubscriberPanicked,

    /// A subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `source` (subscriber name), `reason` (`full` / `closed`)
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Message number of the alarm, if applicable.
    pub alarm: Option<AlarmId>,
    /// Display text of the alarm, if applicable.
    pub text: Option<Arc<str>>,
    /// Interval in seconds, if applicable.
    pub interval: Option<u32>,

    /// Emitting component for pipeline events (subscriber name).
    pub source: Option<&'static str>,
    /// Human-readable reason (overflow details, panic info).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            alarm: None,
            text: None,
            interval: None,
            source: None,
            reason: None,
        }
    }

    /// Attaches the alarm id.
    #[inline]
    pub fn with_alarm(mut self, id: AlarmId) -> Self {
        self.alarm = Some(id);
        self
    }

    /// Attaches the display text.
    #[inline]
    pub fn with_text(mut self, text: impl Into<Arc<str>>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Attaches the interval in seconds.
    #[inline]
    pub fn with_interval(mut self, seconds: u32) -> Self {
        self.interval = Some(seconds);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"));
        ev.source = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.source = Some(subscriber);
        ev
    }

    /// Returns true for the five alarm lifecycle kinds.
    #[inline]
    pub fn is_alarm_event(&self) -> bool {
        !matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }

    /// Display text or empty string.
    #[inline]
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::Tick);
        let b = Event::new(EventKind::Tick);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_overflow_event_carries_source() {
        let ev = Event::subscriber_overflow("console", "full");
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.source, Some("console"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=console reason=full"));
        assert!(!ev.is_alarm_event());
    }

    #[test]
    fn test_alarm_builder_fields() {
        let ev = Event::new(EventKind::Cancelled).with_alarm(-3).with_text("bye");
        assert!(ev.is_alarm_event());
        assert_eq!(ev.alarm, Some(-3));
        assert_eq!(ev.text_or_empty(), "bye");
        assert_eq!(ev.interval, None);
    }
}

//! # ConsoleWriter — status line printer
//!
//! A subscriber that prints alarm notifications to stdout, one status line per event.
//!
//! ## Example output
//! ```text
//! DISPLAY THREAD CREATED FOR: Message(2) take a break
//! Message(2) take a break
//! MESSAGE CHANGED: Message(2) stretch
//! Message(2) stretch
//! CANCEL: Message(2) stretch
//! DISPLAY THREAD EXITING: Message(2) stretch
//! [subscriber-overflow] subscriber="console" reason="full"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Status line writer subscriber.
#[derive(Default)]
pub struct ConsoleWriter;

impl ConsoleWriter {
    /// Construct a new [`ConsoleWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders an event as a single status line (without trailing newline).
    pub fn render(e: &Event) -> String {
        let id = e.alarm.unwrap_or_default();
        let text = e.text_or_empty();
        match e.kind {
            EventKind::WorkerCreated => {
                format!("DISPLAY THREAD CREATED FOR: Message({id}) {text}")
            }
            EventKind::Tick => format!("Message({id}) {text}"),
            EventKind::MessageChanged => format!("MESSAGE CHANGED: Message({id}) {text}"),
            EventKind::Cancelled => format!("CANCEL: Message({id}) {text}"),
            EventKind::WorkerExiting => {
                format!("DISPLAY THREAD EXITING: Message({id}) {text}")
            }
            EventKind::SubscriberOverflow => format!(
                "[subscriber-overflow] subscriber={:?} reason={:?}",
                e.source.unwrap_or("unknown"),
                e.reason.as_deref().unwrap_or("unknown"),
            ),
            EventKind::SubscriberPanicked => format!(
                "[subscriber-panicked] subscriber={} info={}",
                e.source.unwrap_or("unknown"),
                e.reason.as_deref().unwrap_or("unknown"),
            ),
        }
    }
}

#[async_trait]
impl Subscribe for ConsoleWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", Self::render(e));
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

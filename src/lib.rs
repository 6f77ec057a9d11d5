//! # alarmvisor
//!
//! **alarmvisor** keeps a set of periodic alarm messages on screen. Each alarm
//! is displayed by its own worker; an alarm's message can be replaced while it
//! runs, and an alarm can be cancelled mid-flight.
//!
//! ## Architecture
//! ```text
//!   "5 Message(1) stretch"      "Cancel: Message(1)"
//!            │                          │
//!            ▼                          ▼
//!     Command::parse ───────────► Alarms::submit
//!                                       │ (gate)
//!                                       ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Registry (ordered by message number, behind the access gate)     │
//! │  - insert: add, or supersede in place                             │
//! │  - cancel: queue a cancel for a live message                      │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        │ notify
//!        ▼
//! ┌──────────────┐  spawn   ┌───────────────┐   ┌───────────────┐
//! │  Dispatcher  │ ───────► │ DisplayWorker │   │ DisplayWorker │ ...
//! │ (one task)   │  remove  │  (message 1)  │   │  (message 2)  │
//! └──────┬───────┘          └───────┬───────┘   └───────┬───────┘
//!        │ WorkerCreated            │ Tick              │ MessageChanged
//!        │ Cancelled                │ WorkerExiting     │ ...
//!        ▼                          ▼                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                     Bus (broadcast channel)                       │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                          ┌────────┼────────┐
//!                          ▼        ▼        ▼
//!                    ConsoleWriter custom   ...
//! ```
//!
//! ### Lifecycle of one alarm
//! ```text
//! submit Message(k) ──► Registry (just_submitted) ──► Dispatcher claims ──► WorkerCreated
//!
//! worker loop {
//!   ├─► record gone?        ─► WorkerExiting, exit
//!   ├─► superseded again?   ─► MessageChanged, restart tick count
//!   ├─► ticks < interval?   ─► Tick
//!   └─► sleep(interval)
//! }
//!
//! submit Cancel(k) ──► Registry ──► Dispatcher claims ──► remove(k) ──► Cancelled
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                 |
//! |-------------------|----------------------------------------------------------|------------------------------------|
//! | **Runtime**       | Submit, supersede and cancel alarms.                     | [`Alarms`], [`AlarmsBuilder`]      |
//! | **Intake**        | Parse command lines.                                     | [`Command`]                        |
//! | **Events**        | Status notifications with per-alarm ordering.            | [`Event`], [`EventKind`]           |
//! | **Subscriber API**| Plug notification sinks into the runtime.                | [`Subscribe`], [`ConsoleWriter`]   |
//! | **Errors**        | Typed errors for submission and parsing.                 | [`SubmitError`], [`ParseError`]    |
//! | **Configuration** | Bus capacity, time unit, wake-on-cancel.                 | [`Config`]                         |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use alarmvisor::{Alarms, Command, Config, ConsoleWriter};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let alarms = Alarms::builder(Config::default())
//!         .with_subscriber(Arc::new(ConsoleWriter::new()))
//!         .build();
//!
//!     alarms.submit(Command::parse("3 Message(1) hello")?).await?;
//!     alarms.submit(Command::parse("Cancel: Message(1)")?).await?;
//!
//!     alarms.shutdown().await;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod intake;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{
    AlarmId, AlarmRequest, Alarms, AlarmsBuilder, Config, RecordKey, RecordView, RequestKind,
    TEXT_LIMIT, truncate_text, wait_for_shutdown_signal,
};
pub use error::{ParseError, SubmitError};
pub use events::{Bus, Event, EventKind};
pub use intake::Command;
pub use subscribers::{ConsoleWriter, Subscribe, SubscriberSet};

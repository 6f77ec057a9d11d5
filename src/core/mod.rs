//! Runtime core: registry, dispatcher and display workers.
//!
//! The public API from this module is [`Alarms`] (with its builder and
//! [`Config`]) plus the request data model.
//!
//! Internal modules:
//! - [`gate`]: the critical region every registry access goes through;
//! - [`registry`]: ordered alarm records and their four mutations;
//! - [`dispatcher`]: claims submissions, spawns workers, removes cancelled alarms;
//! - [`worker`]: displays one alarm periodically until its record is removed;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod alarms;
mod builder;
mod config;
mod dispatcher;
mod gate;
mod registry;
mod request;
mod shutdown;
mod worker;

#[cfg(test)]
mod tests;

pub use alarms::Alarms;
pub use builder::AlarmsBuilder;
pub use config::Config;
pub use request::{
    AlarmId, AlarmRequest, RecordKey, RecordView, RequestKind, TEXT_LIMIT, truncate_text,
};
pub use shutdown::wait_for_shutdown_signal;

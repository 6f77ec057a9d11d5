//! # Command intake.
//!
//! Turns text lines into [`Command`]s. Malformed lines are rejected here and
//! never reach the runtime.

mod command;

pub use command::Command;

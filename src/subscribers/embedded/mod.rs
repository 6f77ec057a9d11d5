//! # Built-in subscribers
//!
//! - [`ConsoleWriter`]: prints notifications as the alarm program's status lines.

mod console;

pub use console::ConsoleWriter;

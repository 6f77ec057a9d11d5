//! Error types used by the alarm runtime and the command intake.
//!
//! This module defines two error enums:
//!
//! - [`SubmitError`] — a request was refused at the runtime boundary.
//! - [`ParseError`] — a command line could not be turned into a [`Command`](crate::Command).
//!
//! Both provide `as_label` for logs. Logical no-ops (cancelling an unknown id,
//! a duplicate cancel) are **not** errors: they are dropped silently.

use thiserror::Error;

/// # Errors produced when submitting a request to the runtime.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// A message request asked for a zero-second interval.
    ///
    /// A worker for such a request would never sleep, so it is refused here.
    #[error("interval must be at least one second")]
    ZeroInterval,

    /// The runtime has been shut down and no longer accepts requests.
    #[error("alarm runtime is shut down")]
    Closed,
}

impl SubmitError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use alarmvisor::SubmitError;
    ///
    /// assert_eq!(SubmitError::Closed.as_label(), "submit_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SubmitError::ZeroInterval => "submit_zero_interval",
            SubmitError::Closed => "submit_closed",
        }
    }
}

/// # Errors produced while parsing a command line.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line was blank.
    #[error("empty command")]
    Empty,

    /// The line matched neither command form.
    #[error("unrecognized command: {line}")]
    Unrecognized {
        /// The offending input, trimmed.
        line: String,
    },

    /// A numeric field did not parse.
    #[error("invalid {field}: {value}")]
    InvalidNumber {
        /// Which field was being read (`seconds` or `message number`).
        field: &'static str,
        /// The raw text.
        value: String,
    },

    /// The interval was zero or negative.
    #[error("interval must be positive, got {seconds}")]
    NonPositiveInterval {
        /// The parsed value.
        seconds: i64,
    },

    /// A message command had no text after `Message(<id>)`.
    #[error("message text is missing")]
    MissingText,
}

impl ParseError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ParseError::Empty => "parse_empty",
            ParseError::Unrecognized { .. } => "parse_unrecognized",
            ParseError::InvalidNumber { .. } => "parse_invalid_number",
            ParseError::NonPositiveInterval { .. } => "parse_non_positive_interval",
            ParseError::MissingText => "parse_missing_text",
        }
    }
}

//! # Command line grammar.
//!
//! ```text
//! <seconds> Message(<id>) <text>     display <text> every <seconds>
//! Cancel: Message(<id>)              cancel message <id>
//! ```
//!
//! Whitespace is allowed before `(` and inside the parentheses. Text runs to
//! the end of the line and is truncated to [`TEXT_LIMIT`](crate::TEXT_LIMIT) bytes.

use std::str::FromStr;

use crate::core::{AlarmId, AlarmRequest, truncate_text};
use crate::error::ParseError;

const MESSAGE: &str = "Message";
const CANCEL: &str = "Cancel:";

/// A validated intake command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `<seconds> Message(<id>) <text>`
    Message {
        id: AlarmId,
        seconds: u32,
        text: String,
    },
    /// `Cancel: Message(<id>)`
    Cancel { id: AlarmId },
}

impl Command {
    /// Parses one input line.
    ///
    /// # Example
    /// ```
    /// use alarmvisor::Command;
    ///
    /// let cmd = Command::parse("5 Message(2) stand up").unwrap();
    /// assert_eq!(cmd, Command::Message { id: 2, seconds: 5, text: "stand up".into() });
    ///
    /// assert_eq!(Command::parse("Cancel: Message(2)").unwrap(), Command::Cancel { id: 2 });
    /// ```
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::Empty);
        }

        if let Some(rest) = line.strip_prefix(CANCEL) {
            let (id, rest) = parse_message_ref(rest.trim_start(), line)?;
            if !rest.trim().is_empty() {
                return Err(unrecognized(line));
            }
            return Ok(Command::Cancel { id });
        }

        let (seconds, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| unrecognized(line))?;
        let seconds = parse_seconds(seconds)?;
        let (id, rest) = parse_message_ref(rest.trim_start(), line)?;

        let text = truncate_text(rest.trim());
        if text.is_empty() {
            return Err(ParseError::MissingText);
        }

        Ok(Command::Message {
            id,
            seconds,
            text: text.to_string(),
        })
    }

    /// The message number this command refers to.
    pub fn id(&self) -> AlarmId {
        match self {
            Command::Message { id, .. } | Command::Cancel { id } => *id,
        }
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::parse(s)
    }
}

impl From<Command> for AlarmRequest {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Message { id, seconds, text } => AlarmRequest::message(id, seconds, &text),
            Command::Cancel { id } => AlarmRequest::cancel(id),
        }
    }
}

/// Parses `Message ( <id> )` at the start of `s`; returns the id and the remainder.
fn parse_message_ref<'a>(s: &'a str, line: &str) -> Result<(AlarmId, &'a str), ParseError> {
    let rest = s
        .strip_prefix(MESSAGE)
        .and_then(|r| r.trim_start().strip_prefix('('))
        .ok_or_else(|| unrecognized(line))?;
    let (raw, rest) = rest.split_once(')').ok_or_else(|| unrecognized(line))?;
    let raw = raw.trim();
    let id = raw.parse::<AlarmId>().map_err(|_| ParseError::InvalidNumber {
        field: "message number",
        value: raw.to_string(),
    })?;
    Ok((id, rest))
}

fn parse_seconds(raw: &str) -> Result<u32, ParseError> {
    let value = raw.parse::<i64>().map_err(|_| ParseError::InvalidNumber {
        field: "seconds",
        value: raw.to_string(),
    })?;
    if value <= 0 {
        return Err(ParseError::NonPositiveInterval { seconds: value });
    }
    u32::try_from(value).map_err(|_| ParseError::InvalidNumber {
        field: "seconds",
        value: raw.to_string(),
    })
}

fn unrecognized(line: &str) -> ParseError {
    ParseError::Unrecognized {
        line: line.to_string(),
    }
}

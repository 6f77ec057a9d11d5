//! # Alarm requests and registry records.
//!
//! - [`AlarmRequest`]: what intake submits (id, kind, interval, deadline, text).
//! - `Record`: the registry-owned entry wrapping a request with its lifecycle flags.
//! - [`RecordView`]: a read-only copy of a record, handed out by snapshots.
//! - [`RecordKey`]: registry-issued handle a display worker uses to find its record.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Caller-supplied message number.
pub type AlarmId = i32;

/// Maximum length of a display text, in bytes.
pub const TEXT_LIMIT: usize = 64;

/// Request classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Display `text` every `interval` seconds.
    Message,
    /// Remove the live message with the same id.
    Cancel,
}

/// Registry-issued handle identifying one record for its whole lifetime.
///
/// Keys are never reused, so a handle cannot be confused with a later record
/// that happens to share the same [`AlarmId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey(pub(crate) u64);

/// A parsed alarm request, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmRequest {
    /// Message number; the matching key for supersede/cancel.
    pub id: AlarmId,
    /// Request kind.
    pub kind: RequestKind,
    /// Repeat period in seconds (zero for cancel requests).
    pub interval: u32,
    /// Submission time plus interval. Informational only.
    pub deadline: SystemTime,
    /// Display payload, at most [`TEXT_LIMIT`] bytes.
    pub text: Arc<str>,
}

impl AlarmRequest {
    /// Builds a message request. `text` is truncated to [`TEXT_LIMIT`] bytes.
    pub fn message(id: AlarmId, interval: u32, text: &str) -> Self {
        Self {
            id,
            kind: RequestKind::Message,
            interval,
            deadline: SystemTime::now() + Duration::from_secs(u64::from(interval)),
            text: Arc::from(truncate_text(text)),
        }
    }

    /// Builds a cancel request for message `id`.
    pub fn cancel(id: AlarmId) -> Self {
        Self {
            id,
            kind: RequestKind::Cancel,
            interval: 0,
            deadline: SystemTime::now(),
            text: Arc::from("Cancel command"),
        }
    }
}

/// Returns the longest prefix of `text` that fits in [`TEXT_LIMIT`] bytes
/// without splitting a character.
pub fn truncate_text(text: &str) -> &str {
    if text.len() <= TEXT_LIMIT {
        return text;
    }
    let mut end = TEXT_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Registry entry. Only the registry touches these fields, always under the gate.
#[derive(Debug)]
pub(crate) struct Record {
    pub key: RecordKey,
    pub request: AlarmRequest,
    /// True from insertion until the dispatcher claims the record.
    pub just_submitted: bool,
    /// True once a later message with the same id replaced the content.
    pub superseded: bool,
    /// True while reachable from the registry.
    pub linked: bool,
    /// Bumped on every supersede.
    pub revision: u64,
}

impl Record {
    pub fn new(key: RecordKey, request: AlarmRequest) -> Self {
        Self {
            key,
            request,
            just_submitted: true,
            superseded: false,
            linked: true,
            revision: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> AlarmId {
        self.request.id
    }

    #[inline]
    pub fn is_message(&self) -> bool {
        self.request.kind == RequestKind::Message
    }

    #[inline]
    pub fn is_cancel(&self) -> bool {
        self.request.kind == RequestKind::Cancel
    }

    pub fn view(&self) -> RecordView {
        RecordView {
            key: self.key,
            id: self.request.id,
            kind: self.request.kind,
            interval: self.request.interval,
            deadline: self.request.deadline,
            text: Arc::clone(&self.request.text),
            just_submitted: self.just_submitted,
            superseded: self.superseded,
            linked: self.linked,
            revision: self.revision,
        }
    }
}

/// Read-only copy of a registry record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView {
    pub key: RecordKey,
    pub id: AlarmId,
    pub kind: RequestKind,
    pub interval: u32,
    pub deadline: SystemTime,
    pub text: Arc<str>,
    pub just_submitted: bool,
    pub superseded: bool,
    pub linked: bool,
    pub revision: u64,
}

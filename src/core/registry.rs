//! # Alarm registry - ordered set of alarm records.
//!
//! The registry owns every live record. It lives inside the [`Gate`](super::gate::Gate),
//! so each method below runs inside the critical region by construction
//! (`&mut Registry` is only reachable through a gate guard).
//!
//! ## Operations
//! ```text
//! Intake     ──► insert(req)          add, or supersede the live message in place
//! Intake     ──► cancel(req)          queue a cancel if a live message exists
//! Dispatcher ──► take_next_submitted  claim the first unclaimed record (id order)
//! Dispatcher ──► remove(id)           drop the message and its pending cancel
//! Worker     ──► observe(key)         read current text/interval/revision
//! ```
//!
//! ## Rules
//! - Records are sorted by ascending id; equal ids keep insertion order.
//! - At most one message record per id; resubmission rewrites it in place.
//! - At most one pending cancel per id, and only while a message for that id exists.
//! - Only the dispatcher removes records; workers never mutate.

use std::sync::Arc;

use super::request::{AlarmId, AlarmRequest, Record, RecordKey, RecordView, RequestKind};

/// Result of [`Registry::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsertOutcome {
    /// A new message record was spliced in.
    Added(RecordKey),
    /// The live message with the same id was rewritten in place.
    Superseded(RecordKey),
}

/// Result of [`Registry::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CancelOutcome {
    /// A cancel record was spliced in for the dispatcher.
    Queued(RecordKey),
    /// No live message with that id; dropped.
    NoSuchMessage,
    /// A cancel for that id is already pending; dropped.
    AlreadyPending,
}

/// A record claimed by the dispatcher.
#[derive(Debug, Clone)]
pub(crate) struct Submission {
    pub key: RecordKey,
    pub id: AlarmId,
    pub kind: RequestKind,
    pub interval: u32,
    pub text: Arc<str>,
}

/// What a removal took out of the registry.
#[derive(Debug, Clone)]
pub(crate) struct Removal {
    /// Key of the removed message record.
    pub message: RecordKey,
    /// Its text at removal time.
    pub text: Arc<str>,
}

/// Current state of a record as seen by its display worker.
#[derive(Debug, Clone)]
pub(crate) struct Observation {
    pub interval: u32,
    pub text: Arc<str>,
    pub superseded: bool,
    pub revision: u64,
}

/// Ordered collection of alarm records.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    records: Vec<Record>,
    next_key: u64,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message request, or supersedes the live message with the same id.
    pub fn insert(&mut self, req: AlarmRequest) -> InsertOutcome {
        if let Some(live) = self.live_message_mut(req.id) {
            live.request.text = req.text;
            live.request.interval = req.interval;
            live.request.deadline = req.deadline;
            live.superseded = true;
            live.revision += 1;
            return InsertOutcome::Superseded(live.key);
        }
        InsertOutcome::Added(self.splice(req))
    }

    /// Queues a cancel request if a live message exists and no cancel is pending.
    pub fn cancel(&mut self, req: AlarmRequest) -> CancelOutcome {
        if self.live_message(req.id).is_none() {
            return CancelOutcome::NoSuchMessage;
        }
        if self
            .records
            .iter()
            .any(|r| r.id() == req.id && r.is_cancel())
        {
            return CancelOutcome::AlreadyPending;
        }
        CancelOutcome::Queued(self.splice(req))
    }

    /// Claims the first record (in id order) the dispatcher has not seen yet.
    pub fn take_next_submitted(&mut self) -> Option<Submission> {
        let rec = self.records.iter_mut().find(|r| r.just_submitted)?;
        rec.just_submitted = false;
        Some(Submission {
            key: rec.key,
            id: rec.id(),
            kind: rec.request.kind,
            interval: rec.request.interval,
            text: Arc::clone(&rec.request.text),
        })
    }

    /// Unlinks and drops the message record for `id` together with its cancel record.
    ///
    /// Returns `None` if no message record existed (pending cancels are still dropped).
    pub fn remove(&mut self, id: AlarmId) -> Option<Removal> {
        let mut removal = None;
        self.records.retain_mut(|r| {
            if r.id() != id {
                return true;
            }
            r.linked = false;
            if r.is_message() {
                removal = Some(Removal {
                    message: r.key,
                    text: Arc::clone(&r.request.text),
                });
            }
            false
        });
        removal
    }

    /// Reads the record behind `key`, or `None` once it has been unlinked.
    pub fn observe(&self, key: RecordKey) -> Option<Observation> {
        self.records
            .iter()
            .find(|r| r.key == key && r.linked)
            .map(|r| Observation {
                interval: r.request.interval,
                text: Arc::clone(&r.request.text),
                superseded: r.superseded,
                revision: r.revision,
            })
    }

    /// Returns an ordered copy of every record.
    pub fn snapshot(&self) -> Vec<RecordView> {
        self.records.iter().map(Record::view).collect()
    }

    /// Number of records (messages and pending cancels).
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the registry holds no records.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    fn live_message(&self, id: AlarmId) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| r.id() == id && r.is_message() && r.linked)
    }

    fn live_message_mut(&mut self, id: AlarmId) -> Option<&mut Record> {
        self.records
            .iter_mut()
            .find(|r| r.id() == id && r.is_message() && r.linked)
    }

    /// Inserts after every record whose id is `<= req.id` (stable id order).
    fn splice(&mut self, req: AlarmRequest) -> RecordKey {
        self.next_key += 1;
        let key = RecordKey(self.next_key);
        let at = self.records.partition_point(|r| r.id() <= req.id);
        self.records.insert(at, Record::new(key, req));
        key
    }
}

//! Append-only, in-memory event log for one session.

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// A committed event plus its position in the session stream.
///
/// `sequence_number` is monotonically increasing and starts at 1; it is the
/// unit a persistent store would append, kept in memory here because session
/// history is discarded when the session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEvent<E> {
    sequence_number: u64,
    payload: E,
}

impl<E> RecordedEvent<E> {
    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

/// Append-only log of the events committed during one session.
///
/// No locking: the session model is single-threaded and synchronous, so the
/// log is owned by exactly one actor and mutated between user events only.
#[derive(Debug, Clone)]
pub struct SessionLog<E> {
    entries: Vec<RecordedEvent<E>>,
}

impl<E: Event> SessionLog<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a committed event and return its sequence number.
    pub fn append(&mut self, payload: E) -> u64 {
        let sequence_number = self.entries.len() as u64 + 1;
        self.entries.push(RecordedEvent {
            sequence_number,
            payload,
        });
        sequence_number
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&RecordedEvent<E>> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordedEvent<E>> {
        self.entries.iter()
    }
}

impl<E: Event> Default for SessionLog<E> {
    fn default() -> Self {
        Self::new()
    }
}

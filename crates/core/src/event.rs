//! Event types for the transaction log
//!
//! An [`Event`] is the immutable record of one mutation. Events carry the
//! plain (unescaped) value; escaping happens only at the record codec.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of mutation recorded by an event
///
/// The discriminants are the on-disk tags and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventKind {
    /// Key removal
    Delete = 1,
    /// Key insert or overwrite
    Put = 2,
}

impl EventKind {
    /// On-disk tag for this kind
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Parse an on-disk tag
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(EventKind::Delete),
            2 => Some(EventKind::Put),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Delete => f.write_str("delete"),
            EventKind::Put => f.write_str("put"),
        }
    }
}

/// One recorded mutation
///
/// `sequence` is 0 until the writer assigns one; events read back from a
/// log always carry the persisted sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Sequence number (monotonic within a log file)
    pub sequence: u64,
    /// Put or Delete
    pub kind: EventKind,
    /// Key being mutated
    pub key: String,
    /// Value for Put, `None` for Delete
    pub value: Option<String>,
}

impl Event {
    /// Create an unsequenced Put event
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            sequence: 0,
            kind: EventKind::Put,
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Create an unsequenced Delete event
    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            sequence: 0,
            kind: EventKind::Delete,
            key: key.into(),
            value: None,
        }
    }

    /// Return this event stamped with `sequence`
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Value as a string slice, empty for Delete
    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

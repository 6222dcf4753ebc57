//! Error types for kvlog
//!
//! One enum covers the whole taxonomy so the store, the transaction log and
//! the network layer agree on what each failure means:
//!
//! | Variant | Where | Severity |
//! |---------|-------|----------|
//! | NoSuchKey | store lookup | recoverable, caller-visible |
//! | InvalidKey | before mutation | caller-visible |
//! | LogWriteFailure | writer task | surfaced on the error signal only |
//! | LogCorruption | replay | fatal to startup |
//! | ValueDecodingFailure | replay | fatal to startup |
//! | MalformedRecord | replay | fatal to startup |
//! | LogReadFailure | replay | fatal to startup |
//! | ReplayFailed | `run` after a failed scan | fatal to startup |

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for kvlog operations
pub type Result<T> = std::result::Result<T, Error>;

/// All kvlog errors
#[derive(Debug, Error)]
pub enum Error {
    /// Lookup miss
    #[error("no such key: {0}")]
    NoSuchKey(String),

    /// Key cannot be stored or logged
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey {
        /// The rejected key
        key: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// The log file could not be opened or created
    #[error("cannot open transaction log file {}: {source}", path.display())]
    Open {
        /// Path of the log file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// I/O failure while persisting a record
    #[error("cannot write to log file: {0}")]
    LogWriteFailure(#[source] io::Error),

    /// A record's sequence number did not strictly increase
    #[error("transaction numbers out of sequence: {found} follows {last}")]
    LogCorruption {
        /// Last sequence number accepted
        last: u64,
        /// Offending sequence number
        found: u64,
    },

    /// A Put value could not be unescaped
    #[error("value decoding failure at sequence {sequence}: {reason}")]
    ValueDecodingFailure {
        /// Sequence number of the record
        sequence: u64,
        /// What was wrong with the escaped value
        reason: String,
    },

    /// A log line did not have the expected shape
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number in the log file
        line: u64,
        /// What failed to parse
        reason: String,
    },

    /// I/O failure while scanning the log
    #[error("transaction log read failure: {0}")]
    LogReadFailure(#[source] io::Error),

    /// The logger has not been switched into write mode yet
    #[error("transaction logger is not running")]
    NotRunning,

    /// The logger has been closed
    #[error("transaction logger is closed")]
    Closed,

    /// `read_events` was called twice, or after the logger started writing
    #[error("transaction log replay has already been started")]
    ReplayAlreadyStarted,

    /// The replay scan stopped on an error, so writes cannot be numbered safely
    #[error("transaction log replay failed; refusing to accept writes")]
    ReplayFailed,
}

impl Error {
    /// Check if this is a lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NoSuchKey(_))
    }

    /// Check if this error must abort startup when seen during replay.
    pub fn is_fatal_for_replay(&self) -> bool {
        matches!(
            self,
            Error::LogCorruption { .. }
                | Error::ValueDecodingFailure { .. }
                | Error::MalformedRecord { .. }
                | Error::LogReadFailure(_)
                | Error::ReplayFailed
        )
    }

    /// Check if this error comes from the logger's lifecycle rather than data.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Error::NotRunning | Error::Closed | Error::LogWriteFailure(_)
        )
    }
}

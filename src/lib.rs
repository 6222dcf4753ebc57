//! # kvlog
//!
//! Durable in-memory key-value store.
//!
//! Every mutation is applied to an in-memory map first and then handed to an
//! append-only transaction log, which a single background task writes in
//! submission order. On startup the log is replayed to rebuild the map.
//!
//! ## Quick Start
//!
//! ```ignore
//! use kvlog::prelude::*;
//!
//! let db = KvLog::open("/tmp/transactions.log").await?;
//!
//! db.put("user:1", "Alice").await?;
//! assert_eq!(db.get("user:1")?, "Alice");
//! db.delete("user:1").await?;
//!
//! // Everything submitted so far is in the file
//! db.flush().await;
//!
//! // Graceful shutdown
//! db.close().await?;
//! ```
//!
//! ## Durability Window
//!
//! `put`/`delete` return once the log record is queued, not once it is on
//! disk. A crash between the two loses the record even though readers
//! already saw the new value. Call [`KvLog::flush`] when that matters.

#![warn(missing_docs)]

mod database;

pub mod prelude;

// Re-export main entry points
pub use database::{KvLog, KvLogBuilder, Stats, DEFAULT_LOG_PATH};

// Re-export the shared error taxonomy
pub use kvlog_core::{Error, Result};

// Re-export building blocks
pub use kvlog_core::{Event, EventKind};
pub use kvlog_durability::{
    decode_record, encode_record, escape_value, unescape_value, LoggerOptions, ReplayDriver,
    ReplayReport, TransactionLogger,
};
pub use kvlog_storage::KeyValueStore;

//! Convenient imports for kvlog.
//!
//! ```ignore
//! use kvlog::prelude::*;
//!
//! let db = KvLog::open("/tmp/transactions.log").await?;
//! db.put("key", "value").await?;
//! ```

// Main entry point
pub use crate::database::{KvLog, KvLogBuilder, Stats};

// Error handling
pub use kvlog_core::{Error, Result};

// Core types
pub use kvlog_core::{Event, EventKind};

// Configuration
pub use kvlog_durability::{LoggerOptions, ReplayReport};

//! Main entry point for kvlog.
//!
//! This module provides the `KvLog` struct, which ties the in-memory store
//! to its transaction log.

use kvlog_core::{validate_key, Result};
use kvlog_durability::{LoggerOptions, ReplayDriver, ReplayReport, TransactionLogger};
use kvlog_storage::KeyValueStore;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Log file used when no path is configured
pub const DEFAULT_LOG_PATH: &str = "/tmp/transactions.log";

/// A durable key-value store.
///
/// Created with [`KvLog::open`] or [`KvLog::builder`]. Opening replays the
/// log into a fresh store before the handle is returned, so no caller can
/// observe or mutate a half-rebuilt store.
///
/// # Example
///
/// ```ignore
/// let db = KvLog::builder()
///     .path("/var/lib/kvlog/transactions.log")
///     .sync_every_write(true)
///     .open()
///     .await?;
///
/// db.put("key", "value").await?;
/// db.close().await?;
/// ```
pub struct KvLog {
    store: Arc<KeyValueStore>,
    logger: Arc<TransactionLogger>,
    replay: ReplayReport,
}

impl KvLog {
    /// Open the store backed by the log at `path`.
    ///
    /// Uses default logger options.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().path(path).open().await
    }

    /// Create a builder for store configuration.
    pub fn builder() -> KvLogBuilder {
        KvLogBuilder::new()
    }

    /// Insert or overwrite a value.
    ///
    /// The store is updated first; the log record is queued afterwards. If
    /// the logger has been closed the store still holds the new value and
    /// [`Error::Closed`](kvlog_core::Error::Closed) is returned.
    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.store.put(key, value);
        self.logger.write_put(key, value).await
    }

    /// Get a value.
    ///
    /// Fails with [`Error::NoSuchKey`](kvlog_core::Error::NoSuchKey) when the
    /// key is absent.
    pub fn get(&self, key: &str) -> Result<String> {
        self.store.get(key)
    }

    /// Delete a key. Deleting an absent key succeeds and is still logged.
    pub async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.store.delete(key);
        self.logger.write_delete(key).await
    }

    /// Wait until every mutation submitted so far has been written.
    pub async fn flush(&self) {
        self.logger.wait().await
    }

    /// Gracefully close the store.
    ///
    /// Drains pending log writes and closes the file. Reads keep working;
    /// mutations fail afterwards.
    pub async fn close(&self) -> Result<()> {
        self.logger.close().await
    }

    /// The in-memory store.
    pub fn store(&self) -> &Arc<KeyValueStore> {
        &self.store
    }

    /// The transaction logger.
    pub fn logger(&self) -> &Arc<TransactionLogger> {
        &self.logger
    }

    /// What startup replay did.
    pub fn replay_report(&self) -> &ReplayReport {
        &self.replay
    }

    /// Current counters.
    pub fn stats(&self) -> Stats {
        Stats {
            keys: self.store.len(),
            last_sequence: self.logger.last_sequence(),
            pending_writes: self.logger.pending_writes(),
            failed_writes: self.logger.failed_writes(),
            replayed_events: self.replay.events_replayed,
        }
    }
}

impl std::fmt::Debug for KvLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvLog")
            .field("store", &self.store)
            .field("logger", &self.logger)
            .finish()
    }
}

/// Point-in-time counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Keys currently in the store
    pub keys: usize,
    /// Last sequence number written or replayed
    pub last_sequence: u64,
    /// Log records queued but not yet written
    pub pending_writes: u64,
    /// Log records the writer failed to persist
    pub failed_writes: u64,
    /// Events applied during startup replay
    pub replayed_events: u64,
}

/// Builder for store configuration.
///
/// # Example
///
/// ```ignore
/// // Production: fsync every record
/// let db = KvLog::builder().path("./data/transactions.log").strict().open().await?;
///
/// // Larger queue for bursty writers
/// let db = KvLog::builder().path("./t.log").queue_capacity(1024).open().await?;
/// ```
#[derive(Debug, Clone)]
pub struct KvLogBuilder {
    path: PathBuf,
    options: LoggerOptions,
}

impl KvLogBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOG_PATH),
            options: LoggerOptions::default(),
        }
    }

    /// Set the log file path.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    /// Replace all logger options.
    pub fn options(mut self, options: LoggerOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the writer queue capacity.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.options = self.options.with_queue_capacity(capacity);
        self
    }

    /// fsync after every record.
    pub fn sync_every_write(mut self, sync: bool) -> Self {
        self.options = self.options.with_sync_every_write(sync);
        self
    }

    /// Shorthand for `sync_every_write(true)`.
    pub fn strict(self) -> Self {
        self.sync_every_write(true)
    }

    /// Open the log, replay it into a new store and start the writer.
    ///
    /// Replay errors are returned as-is; the log is left untouched.
    pub async fn open(self) -> Result<KvLog> {
        let logger = Arc::new(TransactionLogger::open_with(&self.path, self.options)?);
        let store = Arc::new(KeyValueStore::new());
        let replay = ReplayDriver::restore(&store, &logger).await?;

        Ok(KvLog {
            store,
            logger,
            replay,
        })
    }
}

impl Default for KvLogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

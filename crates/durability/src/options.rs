//! Transaction logger options

/// Options for [`TransactionLogger`](crate::TransactionLogger)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerOptions {
    /// Capacity of the event queue between callers and the writer task.
    ///
    /// `write_put`/`write_delete` suspend once this many events are waiting.
    pub queue_capacity: usize,
    /// Capacity of the replay event channel
    pub replay_buffer: usize,
    /// Capacity of the live write-failure broadcast
    pub error_capacity: usize,
    /// fsync (`sync_data`) after every record instead of only flushing to the OS
    pub sync_every_write: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        LoggerOptions {
            queue_capacity: 16,
            replay_buffer: 16,
            error_capacity: 16,
            sync_every_write: false,
        }
    }
}

impl LoggerOptions {
    /// Sync every record to disk before counting it as written
    pub fn strict() -> Self {
        LoggerOptions {
            sync_every_write: true,
            ..Default::default()
        }
    }

    /// Set the event queue capacity (minimum 1)
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Enable or disable per-record fsync
    pub fn with_sync_every_write(mut self, sync: bool) -> Self {
        self.sync_every_write = sync;
        self
    }
}

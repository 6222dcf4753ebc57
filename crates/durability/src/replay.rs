//! Startup replay
//!
//! Rebuilds a [`KeyValueStore`] from the transaction log, then switches the
//! logger into write mode.
//!
//! ## Replay Sequence
//!
//! 1. Start the log scan (`read_events`)
//! 2. Wait on whichever of {next event, error} arrives first
//! 3. Apply each event to the store
//! 4. Finish when both channels are exhausted, or abort on the first error
//! 5. On clean exhaustion, start the writer (`run`)
//!
//! ## Key Principle
//!
//! The logger never accepts writes against a store it could not rebuild.
//! An error during replay is returned and the writer is not started.

use crate::logger::TransactionLogger;
use kvlog_core::{EventKind, Result};
use kvlog_storage::KeyValueStore;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Outcome of a clean replay
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    /// Events applied to the store
    pub events_replayed: u64,
    /// Put events among them
    pub puts: u64,
    /// Delete events among them
    pub deletes: u64,
    /// Sequence number of the last replayed record (0 for an empty log)
    pub last_sequence: u64,
    /// Wall time spent replaying
    pub elapsed: Duration,
}

impl ReplayReport {
    /// Get human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "{} events replayed ({} puts, {} deletes), last sequence {}, {:.2}ms",
            self.events_replayed,
            self.puts,
            self.deletes,
            self.last_sequence,
            self.elapsed.as_secs_f64() * 1000.0
        )
    }
}

/// Startup orchestration: replay, then go live
pub struct ReplayDriver;

impl ReplayDriver {
    /// Replay the log into `store` and start the logger's writer
    ///
    /// `Ok` means the log was read to the end; `Err` carries the error that
    /// stopped the scan, in which case the logger stays out of write mode.
    pub async fn restore(
        store: &KeyValueStore,
        logger: &TransactionLogger,
    ) -> Result<ReplayReport> {
        let start = Instant::now();
        let mut report = ReplayReport::default();

        let (mut events, mut errors) = logger.read_events()?;
        let mut events_open = true;
        let mut errors_open = true;

        while events_open || errors_open {
            tokio::select! {
                event = events.recv(), if events_open => match event {
                    Some(event) => {
                        store.apply(&event);
                        match event.kind {
                            EventKind::Put => report.puts += 1,
                            EventKind::Delete => report.deletes += 1,
                        }
                        report.events_replayed += 1;
                        report.last_sequence = event.sequence;
                    }
                    None => events_open = false,
                },
                err = errors.recv(), if errors_open => match err {
                    Some(e) => {
                        error!(
                            replayed = report.events_replayed,
                            error = %e,
                            "transaction log replay failed"
                        );
                        return Err(e);
                    }
                    None => errors_open = false,
                },
            }
        }

        report.elapsed = start.elapsed();
        info!("{}", report.summary());

        logger.run().await?;
        Ok(report)
    }
}

//! Transaction logger
//!
//! Append-only log of store mutations with an asynchronous single writer.
//!
//! ## Lifecycle
//!
//! ```text
//! open() ──► Replay ──run()──► Running ──close()──► Closed
//!              │
//!              └─ read_events() (at most once)
//! ```
//!
//! ## Write path
//!
//! `write_put`/`write_delete` bump the outstanding counter and push the event
//! onto a bounded queue, then return. One writer task drains the queue in
//! FIFO order, assigns the next sequence number, appends the record and
//! decrements the counter. Log order is therefore submission order.
//!
//! I/O failures in the writer never reach the caller of `write_put`; they
//! are counted and broadcast to [`TransactionLogger::subscribe_errors`].
//!
//! ## Read path
//!
//! `read_events` scans the file from the start on its own read handle and
//! yields events on one channel and at most one error on another. Both
//! channels close when the scan ends.
//!
//! `run` detaches whoever is still consuming the scan. The reader then
//! checks the rest of the file for sequence numbers only, so the writer
//! always numbers after the last record on disk.

use crate::encoding::{decode_record, encode_record};
use crate::options::LoggerOptions;
use kvlog_core::{validate_key, Error, Event, Result};
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, mpsc, watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// State shared between the logger handle and its tasks
struct Shared {
    /// Last sequence number assigned (write mode) or seen (replay)
    last_sequence: AtomicU64,
    /// Events submitted but not yet written (or failed)
    pending: watch::Sender<u64>,
    failed_writes: AtomicU64,
    errors: broadcast::Sender<Arc<Error>>,
    /// Tells the reader to stop delivering events
    detach_replay: Notify,
    /// Set when the replay scan stopped on an error
    replay_failed: AtomicBool,
}

impl Shared {
    fn begin_write(&self) {
        self.pending.send_modify(|n| *n += 1);
    }

    fn finish_write(&self) {
        self.pending.send_modify(|n| *n = n.saturating_sub(1));
    }

    fn report_write_failure(&self, sequence: u64, err: io::Error) {
        self.failed_writes.fetch_add(1, Ordering::SeqCst);
        error!(sequence, error = %err, "transaction log write failed");
        // No subscribers is fine; the failure is still counted.
        let _ = self.errors.send(Arc::new(Error::LogWriteFailure(err)));
    }
}

enum Mode {
    Replay {
        file: std::fs::File,
        replay_started: bool,
        reader: Option<JoinHandle<()>>,
    },
    Running {
        events: mpsc::Sender<Event>,
        writer: JoinHandle<File>,
    },
    Closed,
}

/// Durable, ordered record of every store mutation
///
/// All methods take `&self`; share the logger with `Arc` once it is running.
/// `read_events` and `run` spawn Tokio tasks and must be called from within
/// a Tokio runtime.
///
/// # Example
///
/// ```ignore
/// let logger = TransactionLogger::open("/tmp/transactions.log")?;
/// logger.run().await?;
///
/// logger.write_put("a", "1").await?;
/// logger.write_delete("a").await?;
///
/// logger.wait().await;   // both records are in the file
/// logger.close().await?;
/// ```
pub struct TransactionLogger {
    path: PathBuf,
    options: LoggerOptions,
    mode: Mutex<Mode>,
    shared: Arc<Shared>,
}

impl TransactionLogger {
    /// Open (or create) the log at `path` with default options
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, LoggerOptions::default())
    }

    /// Open (or create) the log at `path`
    ///
    /// Missing parent directories are created. The file is opened for read
    /// and append; existing content is never rewritten.
    pub fn open_with(path: impl AsRef<Path>, options: LoggerOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| Error::Open {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(open_err)?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)
            .map_err(open_err)?;

        let (pending, _) = watch::channel(0u64);
        let (errors, _) = broadcast::channel(options.error_capacity.max(1));

        info!(path = %path.display(), "opened transaction log");

        Ok(TransactionLogger {
            path,
            options,
            mode: Mutex::new(Mode::Replay {
                file,
                replay_started: false,
                reader: None,
            }),
            shared: Arc::new(Shared {
                last_sequence: AtomicU64::new(0),
                pending,
                failed_writes: AtomicU64::new(0),
                errors,
                detach_replay: Notify::new(),
                replay_failed: AtomicBool::new(false),
            }),
        })
    }

    /// Scan the log from the beginning
    ///
    /// Returns a channel of events in file order and a parallel channel that
    /// carries at most one error. On an out-of-sequence record, a bad value
    /// escape, a malformed line or an I/O failure, the error is sent and no
    /// further events follow. End of file closes both channels without an
    /// error.
    ///
    /// Replay is one-shot: a second call, or a call after [`run`](Self::run),
    /// fails with [`Error::ReplayAlreadyStarted`].
    pub fn read_events(&self) -> Result<(mpsc::Receiver<Event>, mpsc::Receiver<Error>)> {
        let mut mode = self.mode.lock();
        match &mut *mode {
            Mode::Replay {
                replay_started: true,
                ..
            }
            | Mode::Running { .. } => Err(Error::ReplayAlreadyStarted),
            Mode::Closed => Err(Error::Closed),
            Mode::Replay {
                replay_started,
                reader,
                ..
            } => {
                let file = std::fs::File::open(&self.path).map_err(|source| Error::Open {
                    path: self.path.clone(),
                    source,
                })?;

                let (event_tx, event_rx) = mpsc::channel(self.options.replay_buffer.max(1));
                let (error_tx, error_rx) = mpsc::channel(1);

                *reader = Some(tokio::spawn(read_loop(
                    file,
                    Arc::clone(&self.shared),
                    event_tx,
                    error_tx,
                )));
                *replay_started = true;

                debug!(path = %self.path.display(), "replaying transaction log");
                Ok((event_rx, error_rx))
            }
        }
    }

    /// Switch into write mode and start the writer task
    ///
    /// If a replay scan is still in flight, its consumer is detached: no
    /// further events are delivered, but the reader still checks the rest of
    /// the file so new records are numbered after the last one on disk.
    /// Fails with [`Error::ReplayFailed`] if that scan stopped on an error.
    /// Calling `run` on a running logger does nothing.
    pub async fn run(&self) -> Result<()> {
        let reader = {
            let mut mode = self.mode.lock();
            match &mut *mode {
                Mode::Replay { reader, .. } => reader.take(),
                Mode::Running { .. } => return Ok(()),
                Mode::Closed => return Err(Error::Closed),
            }
        };

        if let Some(reader) = reader {
            self.shared.detach_replay.notify_one();
            if let Err(e) = reader.await {
                warn!(error = %e, "transaction log reader task failed");
                self.shared.replay_failed.store(true, Ordering::SeqCst);
            }
        }
        if self.shared.replay_failed.load(Ordering::SeqCst) {
            return Err(Error::ReplayFailed);
        }

        let mut mode = self.mode.lock();
        match std::mem::replace(&mut *mode, Mode::Closed) {
            Mode::Replay { file, .. } => {
                let (events, rx) = mpsc::channel(self.options.queue_capacity.max(1));
                let writer = tokio::spawn(write_loop(
                    File::from_std(file),
                    rx,
                    Arc::clone(&self.shared),
                    self.options.sync_every_write,
                ));
                *mode = Mode::Running { events, writer };

                info!(
                    path = %self.path.display(),
                    last_sequence = self.last_sequence(),
                    "transaction logger accepting writes"
                );
                Ok(())
            }
            running @ Mode::Running { .. } => {
                *mode = running;
                Ok(())
            }
            Mode::Closed => Err(Error::Closed),
        }
    }

    /// Record a Put
    ///
    /// Returns once the event is queued, not once it is written. Suspends
    /// only while the queue is full.
    pub async fn write_put(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.submit(Event::put(key, value)).await
    }

    /// Record a Delete
    ///
    /// Same queuing semantics as [`write_put`](Self::write_put).
    pub async fn write_delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.submit(Event::delete(key)).await
    }

    async fn submit(&self, event: Event) -> Result<()> {
        let events = {
            let mode = self.mode.lock();
            match &*mode {
                Mode::Running { events, .. } => events.clone(),
                Mode::Replay { .. } => return Err(Error::NotRunning),
                Mode::Closed => return Err(Error::Closed),
            }
        };

        self.shared.begin_write();
        if events.send(event).await.is_err() {
            self.shared.finish_write();
            return Err(Error::Closed);
        }
        Ok(())
    }

    /// Flush barrier
    ///
    /// Resolves once every event submitted before the call has been written
    /// or has reported a failure.
    pub async fn wait(&self) {
        let mut pending = self.shared.pending.subscribe();
        let _ = pending.wait_for(|n| *n == 0).await;
    }

    /// Drain outstanding writes and close the file
    ///
    /// After `close`, writes fail with [`Error::Closed`]. Closing twice is a
    /// no-op.
    pub async fn close(&self) -> Result<()> {
        self.wait().await;

        let previous = {
            let mut mode = self.mode.lock();
            std::mem::replace(&mut *mode, Mode::Closed)
        };

        match previous {
            Mode::Running { events, writer } => {
                drop(events);
                let file = writer
                    .await
                    .map_err(|e| Error::LogWriteFailure(io::Error::other(e)))?;
                file.sync_all().await.map_err(Error::LogWriteFailure)?;

                info!(
                    path = %self.path.display(),
                    last_sequence = self.last_sequence(),
                    failed_writes = self.failed_writes(),
                    "closed transaction log"
                );
            }
            Mode::Replay { reader, .. } => {
                if let Some(reader) = reader {
                    reader.abort();
                }
                debug!(path = %self.path.display(), "closed transaction log before it ran");
            }
            Mode::Closed => {}
        }
        Ok(())
    }

    /// Subscribe to live write failures
    ///
    /// Only failures that happen after subscribing are delivered.
    pub fn subscribe_errors(&self) -> broadcast::Receiver<Arc<Error>> {
        self.shared.errors.subscribe()
    }

    /// Last sequence number written or replayed
    pub fn last_sequence(&self) -> u64 {
        self.shared.last_sequence.load(Ordering::SeqCst)
    }

    /// Events submitted but not yet written
    pub fn pending_writes(&self) -> u64 {
        *self.shared.pending.borrow()
    }

    /// Number of records the writer failed to persist
    pub fn failed_writes(&self) -> u64 {
        self.shared.failed_writes.load(Ordering::SeqCst)
    }

    /// Whether the logger is in write mode
    pub fn is_running(&self) -> bool {
        matches!(*self.mode.lock(), Mode::Running { .. })
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Options the logger was opened with
    pub fn options(&self) -> &LoggerOptions {
        &self.options
    }
}

impl std::fmt::Debug for TransactionLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionLogger")
            .field("path", &self.path)
            .field("running", &self.is_running())
            .field("last_sequence", &self.last_sequence())
            .field("pending_writes", &self.pending_writes())
            .finish()
    }
}

async fn read_loop(
    file: std::fs::File,
    shared: Arc<Shared>,
    events: mpsc::Sender<Event>,
    errors: mpsc::Sender<Error>,
) {
    let mut lines = BufReader::new(File::from_std(file)).lines();
    let mut line_no = 0u64;
    let mut replayed = 0u64;
    let mut attached = true;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                return stop_replay(&shared, &errors, line_no, Error::LogReadFailure(e));
            }
        };
        line_no += 1;
        if line.is_empty() {
            continue;
        }

        let last = shared.last_sequence.load(Ordering::SeqCst);
        let event = match decode_record(&line, line_no, last) {
            Ok(event) => event,
            Err(e) => return stop_replay(&shared, &errors, line_no, e),
        };

        shared.last_sequence.store(event.sequence, Ordering::SeqCst);
        replayed += 1;

        if attached {
            attached = tokio::select! {
                biased;
                _ = shared.detach_replay.notified() => false,
                sent = events.send(event) => sent.is_ok(),
            };
            if !attached {
                debug!(
                    line = line_no,
                    "replay consumer detached, checking sequence numbers only"
                );
            }
        }
    }

    debug!(records = replayed, "reached end of transaction log");
}

fn stop_replay(shared: &Shared, errors: &mpsc::Sender<Error>, line_no: u64, err: Error) {
    warn!(line = line_no, error = %err, "stopping transaction log replay");
    shared.replay_failed.store(true, Ordering::SeqCst);
    // Capacity 1 and at most one error per scan.
    let _ = errors.try_send(err);
}

async fn write_loop(
    mut file: File,
    mut events: mpsc::Receiver<Event>,
    shared: Arc<Shared>,
    sync: bool,
) -> File {
    // A failed append may leave a partial line; start the next record on a
    // fresh line so the fragment stays a malformed line of its own.
    let mut torn = false;

    while let Some(event) = events.recv().await {
        let sequence = shared.last_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let mut record = encode_record(&event.with_sequence(sequence));
        if torn {
            record.insert(0, '\n');
        }

        match append_record(&mut file, record.as_bytes(), sync).await {
            Ok(()) => torn = false,
            Err(e) => {
                torn = true;
                shared.report_write_failure(sequence, e);
            }
        }
        shared.finish_write();
    }

    debug!("transaction log writer drained");
    file
}

async fn append_record(file: &mut File, record: &[u8], sync: bool) -> io::Result<()> {
    file.write_all(record).await?;
    file.flush().await?;
    if sync {
        file.sync_data().await?;
    }
    Ok(())
}

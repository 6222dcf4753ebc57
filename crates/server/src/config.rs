//! Server configuration.
//!
//! Every flag can also be set from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use kvlog::LoggerOptions;

/// Command-line arguments for `kvlog-server`.
#[derive(Debug, Clone, Parser)]
#[command(name = "kvlog-server")]
#[command(author, version, about = "Durable key-value store over HTTP", long_about = None)]
pub struct CliArgs {
    /// Address to listen on.
    #[arg(long, env = "KVLOG_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Path of the transaction log.
    #[arg(long, env = "KVLOG_LOG_PATH", default_value = kvlog::DEFAULT_LOG_PATH)]
    pub log_path: PathBuf,

    /// Log records that may wait for the writer before mutations block.
    #[arg(long, env = "KVLOG_QUEUE_CAPACITY", default_value_t = 16)]
    pub queue_capacity: usize,

    /// fsync the log after every record.
    #[arg(long, env = "KVLOG_SYNC_EVERY_WRITE")]
    pub sync_every_write: bool,

    /// Refuse PUT/DELETE once the log has failed to persist a record.
    #[arg(long, env = "KVLOG_REJECT_WRITES_AFTER_FAILURE")]
    pub reject_writes_after_failure: bool,
}

impl CliArgs {
    /// Logger options derived from the flags.
    pub fn logger_options(&self) -> LoggerOptions {
        LoggerOptions::default()
            .with_queue_capacity(self.queue_capacity)
            .with_sync_every_write(self.sync_every_write)
    }
}

/// Settings the HTTP layer needs at runtime.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub listen: SocketAddr,
    /// Refuse mutations after a log write failure.
    pub reject_writes_after_failure: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            reject_writes_after_failure: false,
        }
    }
}

impl From<&CliArgs> for ServerConfig {
    fn from(args: &CliArgs) -> Self {
        Self {
            listen: args.listen,
            reject_writes_after_failure: args.reject_writes_after_failure,
        }
    }
}

//! kvlog HTTP server binary.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use kvlog::KvLog;
use kvlog_server::{CliArgs, KvServer, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = CliArgs::parse();
    info!(log_path = %args.log_path.display(), listen = %args.listen, "starting kvlog server");

    let db = KvLog::builder()
        .path(&args.log_path)
        .options(args.logger_options())
        .open()
        .await
        .with_context(|| format!("failed to restore {}", args.log_path.display()))?;

    let report = db.replay_report();
    info!(
        events = report.events_replayed,
        last_sequence = report.last_sequence,
        "store restored"
    );

    KvServer::new(Arc::new(db), ServerConfig::from(&args))
        .run()
        .await
        .context("server failed")?;
    Ok(())
}

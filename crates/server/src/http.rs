//! HTTP server setup.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{any, get};
use axum::Router;
use kvlog::KvLog;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::handlers::{
    handle_delete, handle_get, handle_healthy, handle_not_allowed, handle_put, handle_stats,
    log_request, AppState,
};

/// Build the router for `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1", any(handle_not_allowed))
        .route(
            "/v1/:key",
            get(handle_get)
                .put(handle_put)
                .delete(handle_delete)
                .fallback(handle_not_allowed),
        )
        .route("/-/healthy", get(handle_healthy))
        .route("/-/stats", get(handle_stats))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// HTTP server for a [`KvLog`].
pub struct KvServer {
    db: Arc<KvLog>,
    config: ServerConfig,
}

impl KvServer {
    /// Create a server over an opened store.
    pub fn new(db: Arc<KvLog>, config: ServerConfig) -> Self {
        Self { db, config }
    }

    /// The router this server serves.
    pub fn router(&self) -> Router {
        router(AppState {
            db: Arc::clone(&self.db),
            reject_writes_after_failure: self.config.reject_writes_after_failure,
        })
    }

    /// Serve until SIGINT or SIGTERM, then close the store.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.listen).await?;
        info!("kvlog server listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!(
            pending = self.db.logger().pending_writes(),
            "draining transaction log"
        );
        self.db.close().await?;
        info!("server shut down gracefully");
        Ok(())
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, starting graceful shutdown"),
        _ = terminate => info!("received SIGTERM, starting graceful shutdown"),
    }
}

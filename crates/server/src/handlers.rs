//! Route handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kvlog::{KvLog, Stats};
use tracing::{debug, info};

use crate::error::ApiError;

/// Shared state for handlers.
#[derive(Clone)]
pub struct AppState {
    /// The store behind the API
    pub db: Arc<KvLog>,
    /// Refuse mutations after a log write failure
    pub reject_writes_after_failure: bool,
}

impl AppState {
    /// State with default policy.
    pub fn new(db: Arc<KvLog>) -> Self {
        Self {
            db,
            reject_writes_after_failure: false,
        }
    }

    fn check_writable(&self) -> Result<(), ApiError> {
        if self.reject_writes_after_failure && self.db.logger().failed_writes() > 0 {
            return Err(ApiError::WritesRejected);
        }
        Ok(())
    }
}

/// Handle PUT /v1/:key
pub async fn handle_put(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    state.check_writable()?;
    let value = String::from_utf8(body.to_vec())
        .map_err(|_| ApiError::BadRequest("value is not valid UTF-8".to_string()))?;

    state.db.put(&key, &value).await?;
    debug!(%key, bytes = value.len(), "stored value");
    Ok(StatusCode::CREATED)
}

/// Handle GET /v1/:key
pub async fn handle_get(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<String, ApiError> {
    Ok(state.db.get(&key)?)
}

/// Handle DELETE /v1/:key
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.check_writable()?;
    state.db.delete(&key).await?;
    debug!(%key, "deleted key");
    Ok(StatusCode::OK)
}

/// Any method not routed under /v1.
pub async fn handle_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, "Not Allowed")
}

/// Handle GET /-/healthy
pub async fn handle_healthy() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Handle GET /-/stats
pub async fn handle_stats(State(state): State<AppState>) -> Json<Stats> {
    Json(state.db.stats())
}

/// Log one line per request.
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = next.run(request).await;
    info!(%method, %uri, status = response.status().as_u16(), "request");
    response
}

//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kvlog::Error;
use thiserror::Error;
use tracing::error;

/// Errors returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Error from the store or the transaction log
    #[error(transparent)]
    Store(#[from] Error),

    /// Request could not be understood
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The log has failed before and mutations are refused
    #[error("transaction log has failed writes; mutations are disabled")]
    WritesRejected,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(Error::NoSuchKey(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(Error::InvalidKey { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Store(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::WritesRejected => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Listener or connection I/O failure
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store failed to open or close
    #[error("store error: {0}")]
    Store(#[from] Error),
}

//! HTTP front end for kvlog.
//!
//! Routes:
//!
//! | Method | Path | Result |
//! |--------|------|--------|
//! | PUT | `/v1/{key}` | store body, `201 Created` |
//! | GET | `/v1/{key}` | value, or `404` |
//! | DELETE | `/v1/{key}` | `200`, idempotent |
//! | other | `/v1`, `/v1/{key}` | `405` |
//! | GET | `/-/healthy` | `200` |
//! | GET | `/-/stats` | JSON counters |

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;

pub use config::{CliArgs, ServerConfig};
pub use error::{ApiError, ServerError};
pub use handlers::AppState;
pub use http::{router, KvServer};

//! Key validation
//!
//! Keys are written to the log unescaped, so they must not contain the
//! record delimiters.

use crate::error::{Error, Result};

/// Check that `key` can be stored and logged.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidKey {
            key: key.to_string(),
            reason: "key must not be empty",
        });
    }
    if key.contains(|c: char| matches!(c, '\t' | '\n' | '\r')) {
        return Err(Error::InvalidKey {
            key: key.to_string(),
            reason: "key must not contain tabs or line breaks",
        });
    }
    Ok(())
}

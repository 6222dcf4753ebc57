//! Durability Comprehensive Test Suite
//!
//! End-to-end checks of the store, its transaction log and startup replay,
//! driven through the public `kvlog` API against real files.
//!
//! ## Key Verification Points
//!
//! 1. Everything acknowledged and flushed survives a restart
//! 2. Sequence numbers start at 1 and continue across restarts
//! 3. A log that goes backwards refuses to start
//! 4. Values with separators, escapes and non-ASCII text round-trip
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test durability_comprehensive
//!
//! # Replay tests only
//! cargo test --test durability_comprehensive replay::
//! ```

use std::path::{Path, PathBuf};

use kvlog::KvLog;
use tempfile::TempDir;

// Test modules
pub mod flush;
pub mod log_format;
pub mod replay;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Log path inside a fresh temp directory
pub fn temp_log() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("transactions.log");
    (dir, path)
}

/// Open a store at `path`
pub async fn open(path: &Path) -> KvLog {
    KvLog::open(path).await.expect("Failed to open store")
}

/// Log lines without the trailing newline
pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read log")
        .lines()
        .map(str::to_string)
        .collect()
}

/// Values that exercise the escaping rules
pub fn tricky_values() -> Vec<(&'static str, &'static str)> {
    vec![
        ("plain", "hello"),
        ("empty", ""),
        ("spaces", "hello world"),
        ("tab", "a\tb"),
        ("newline", "line1\nline2"),
        ("crlf", "line1\r\nline2"),
        ("percent", "100%"),
        ("escaped_looking", "%41%42"),
        ("plus", "1+1=2"),
        ("unicode", "日本語 🌍 café"),
        ("symbols", "!@#$^&*()[]{}<>?/\\|'\"`~"),
    ]
}

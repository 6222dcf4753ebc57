//! Durability layer for kvlog
//!
//! This crate implements the transaction log behind the store:
//! - Record encoding/decoding (tab-separated lines, percent-escaped values)
//! - TransactionLogger: append-only log with an asynchronous single writer
//! - Flush barrier (`wait`) and cooperative shutdown (`close`)
//! - ReplayDriver: rebuild the store at startup, then go live

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoding;
pub mod logger;
pub mod options;
pub mod replay;

pub use encoding::{decode_record, encode_record, escape_value, unescape_value, Record};
pub use logger::TransactionLogger;
pub use options::LoggerOptions;
pub use replay::{ReplayDriver, ReplayReport};

//! Core types for kvlog
//!
//! This crate defines the types shared by every layer:
//! - Event: one recorded mutation (sequence, kind, key, value)
//! - EventKind: Put or Delete, with the on-disk tag
//! - Key validation rules
//! - Error: the unified error taxonomy and `Result` alias

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod event;
pub mod key;

pub use error::{Error, Result};
pub use event::{Event, EventKind};
pub use key::validate_key;

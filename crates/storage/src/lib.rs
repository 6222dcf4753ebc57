//! Storage layer for kvlog
//!
//! This crate implements the in-memory map behind the service:
//! - KeyValueStore: FxHashMap guarded by a reader/writer lock
//!
//! The store knows nothing about durability. Callers log mutations
//! themselves after the store has accepted them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod store;

pub use store::KeyValueStore;

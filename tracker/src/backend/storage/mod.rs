//! # Storage Module
//!
//! Handles all data persistence for the student tracker.
//!
//! The domain layer only sees the [`KeyValueStorage`] contract: read a text
//! value, write it, remove it. Two implementations are provided:
//!
//! - **json**: one `<key>.json` file per key inside the data directory, with
//!   atomic writes, plus the YAML configuration file
//! - **memory**: a process-local map used by tests and as a scratch backend

pub mod traits;
pub mod json;
pub mod memory;

pub use traits::{Connection, KeyValueStorage, StorageError};
pub use json::{ConfigRepository, JsonConnection, JsonFileRepository, TrackerConfig};
pub use memory::{MemoryConnection, MemoryRepository};

//! # JSON File Storage Module
//!
//! File-based storage for the student tracker.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! ├── tracker_config.yaml    ← ConfigRepository
//! └── students.json          ← JsonFileRepository, key "students"
//! ```
//!
//! Every write goes to a temp file first and is then renamed into place, so a
//! failed write never leaves a half-written value behind.

pub mod connection;
pub mod key_value_repository;
pub mod config_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::JsonConnection;
pub use key_value_repository::JsonFileRepository;
pub use config_repository::{ConfigRepository, TrackerConfig};

//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use thiserror::Error;

/// Reasons a key-value write (or read) can fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The write would exceed the storage budget
    #[error("Storage quota exceeded: {attempted} bytes requested, {quota} allowed")]
    QuotaExceeded { attempted: usize, quota: usize },
    #[error("Storage failure: {0}")]
    Unknown(String),
}

/// Durable key-value storage used by the student store
///
/// Values are opaque text; the student store keeps the JSON array of records
/// under a single key. All operations are synchronous and are never retried.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, `None` if nothing is stored
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Trait defining the interface for storage connections
///
/// This trait abstracts away the specific connection type (files, memory, etc.)
/// and provides factory methods for creating repositories, so the domain
/// layer works with any storage backend without knowing the details.
pub trait Connection: Send + Sync + Clone {
    /// The type of KeyValueStorage this connection creates
    type KeyValueRepository: KeyValueStorage;

    /// Create a new key-value repository for this connection
    fn create_key_value_repository(&self) -> Self::KeyValueRepository;
}

//! In-memory key-value storage.
//!
//! Every repository created from one `MemoryConnection` shares the same map,
//! so a fresh service built on the same connection sees earlier writes. A
//! quota and a forced failure can be configured to exercise error paths.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{Connection, KeyValueStorage, StorageError};

type Entries = Arc<Mutex<HashMap<String, String>>>;

#[derive(Clone, Debug, Default)]
pub struct MemoryConnection {
    entries: Entries,
    quota_bytes: Option<usize>,
    forced_failure: Arc<Mutex<Option<StorageError>>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any single value larger than `quota_bytes`
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    /// Make every following `set` fail with `failure` until cleared with `None`
    pub fn set_forced_failure(&self, failure: Option<StorageError>) {
        if let Ok(mut slot) = self.forced_failure.lock() {
            *slot = failure;
        }
    }
}

impl Connection for MemoryConnection {
    type KeyValueRepository = MemoryRepository;

    fn create_key_value_repository(&self) -> Self::KeyValueRepository {
        MemoryRepository {
            connection: self.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MemoryRepository {
    connection: MemoryConnection,
}

impl MemoryRepository {
    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.connection
            .entries
            .lock()
            .map_err(|_| StorageError::Unknown("memory storage lock poisoned".to_string()))
    }

    fn forced_failure(&self) -> Option<StorageError> {
        self.connection
            .forced_failure
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
    }
}

impl KeyValueStorage for MemoryRepository {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(failure) = self.forced_failure() {
            return Err(failure);
        }
        if let Some(quota) = self.connection.quota_bytes {
            if value.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    attempted: value.len(),
                    quota,
                });
            }
        }
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

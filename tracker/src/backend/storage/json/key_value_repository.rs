use log::{debug, error, info};
use std::fs;

use super::connection::JsonConnection;
use crate::backend::storage::traits::{KeyValueStorage, StorageError};

/// File-based key-value repository: each key lives in its own JSON file
#[derive(Clone, Debug)]
pub struct JsonFileRepository {
    connection: JsonConnection,
}

impl JsonFileRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

impl KeyValueStorage for JsonFileRepository {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let file_path = self.connection.key_file_path(key);
        if !file_path.exists() {
            debug!("No stored value for key '{}'", key);
            return Ok(None);
        }

        fs::read_to_string(&file_path).map(Some).map_err(|e| {
            error!("Failed to read {}: {}", file_path.display(), e);
            StorageError::Unknown(e.to_string())
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.connection.quota_bytes() {
            if value.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    attempted: value.len(),
                    quota,
                });
            }
        }

        let file_path = self.connection.key_file_path(key);
        let temp_path = file_path.with_extension("tmp");

        // Atomic write: temp file, then rename over the old value
        fs::write(&temp_path, value)
            .and_then(|_| fs::rename(&temp_path, &file_path))
            .map_err(|e| {
                error!("Failed to write {}: {}", file_path.display(), e);
                let _ = fs::remove_file(&temp_path);
                StorageError::Unknown(e.to_string())
            })?;

        debug!("Stored {} bytes under key '{}'", value.len(), key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let file_path = self.connection.key_file_path(key);
        if file_path.exists() {
            fs::remove_file(&file_path).map_err(|e| StorageError::Unknown(e.to_string()))?;
            info!("Removed stored value for key '{}'", key);
        }
        Ok(())
    }
}

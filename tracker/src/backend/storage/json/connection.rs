use anyhow::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use super::key_value_repository::JsonFileRepository;
use crate::backend::storage::traits::Connection;

/// Name of the data directory created under the user's documents folder
pub const DEFAULT_DATA_DIRECTORY_NAME: &str = "Student Tracker";

/// JsonConnection manages the data directory that holds one JSON file per key
#[derive(Clone, Debug)]
pub struct JsonConnection {
    base_directory: PathBuf,
    quota_bytes: Option<usize>,
}

impl JsonConnection {
    /// Create a new JSON connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
            quota_bytes: None,
        })
    }

    /// Create a new JSON connection in the default data directory
    /// (~/Documents/Student Tracker, or ~/Student Tracker without a documents folder)
    pub fn new_default() -> Result<Self> {
        let parent = dirs::document_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        Self::new(parent.join(DEFAULT_DATA_DIRECTORY_NAME))
    }

    /// Limit the size of any single stored value
    pub fn with_quota(mut self, quota_bytes: Option<usize>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn quota_bytes(&self) -> Option<usize> {
        self.quota_bytes
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> PathBuf {
        self.base_directory.clone()
    }

    /// Get the file path that stores the value for `key`
    pub fn key_file_path(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.base_directory.join(format!("{}.json", safe_key))
    }
}

impl Connection for JsonConnection {
    type KeyValueRepository = JsonFileRepository;

    fn create_key_value_repository(&self) -> Self::KeyValueRepository {
        JsonFileRepository::new(self.clone())
    }
}

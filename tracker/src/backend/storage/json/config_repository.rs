//! # Tracker Config Repository
//!
//! Stores application settings in a single YAML file, `tracker_config.yaml`,
//! at the root of the data directory.
//!
//! ## YAML Format
//!
//! ```yaml
//! storage_key: students
//! max_serialized_bytes: 5000000
//! storage_quota_bytes: null
//! amount_step: 10.0
//! reset_month_to_current: true
//! data_format_version: "1.0"
//! created_at: "2025-01-21T19:30:00Z"
//! updated_at: "2025-01-21T19:35:00Z"
//! ```
//!
//! A missing file is created with defaults on first load. Missing fields in an
//! existing file take their default values.

use anyhow::Result;
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::connection::JsonConnection;

pub const CONFIG_FILE_NAME: &str = "tracker_config.yaml";

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Key the student collection is stored under
    pub storage_key: String,
    /// Ceiling on the serialized collection, checked before every write
    pub max_serialized_bytes: usize,
    /// Optional byte quota enforced by the file store itself
    pub storage_quota_bytes: Option<usize>,
    /// Step used by the amount increment/decrement controls
    pub amount_step: f64,
    /// Whether resetting filters selects the current month instead of all months
    pub reset_month_to_current: bool,
    pub data_format_version: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            storage_key: "students".to_string(),
            max_serialized_bytes: 5_000_000,
            storage_quota_bytes: None,
            amount_step: 10.0,
            reset_month_to_current: true,
            data_format_version: "1.0".to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ConfigRepository {
    connection: JsonConnection,
}

impl ConfigRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }

    fn config_path(&self) -> PathBuf {
        self.connection.base_directory().join(CONFIG_FILE_NAME)
    }

    /// Load the config from disk, creating a default file if none exists
    pub fn load_or_create(&self) -> Result<TrackerConfig> {
        let config_path = self.config_path();

        if config_path.exists() {
            let yaml_content = fs::read_to_string(&config_path)?;
            let config: TrackerConfig = serde_yaml::from_str(&yaml_content)?;
            debug!("Loaded tracker config from {:?}", config_path);
            Ok(config)
        } else {
            let config = TrackerConfig::default();
            self.save(&config)?;
            info!("Created default tracker config at {:?}", config_path);
            Ok(config)
        }
    }

    /// Persist the config, stamping `updated_at`
    #[cfg(test)]
    pub fn update(&self, config: &TrackerConfig) -> Result<()> {
        let mut updated_config = config.clone();
        updated_config.updated_at = Utc::now().to_rfc3339();
        self.save(&updated_config)?;
        info!("Updated tracker config");
        Ok(())
    }

    fn save(&self, config: &TrackerConfig) -> Result<()> {
        let config_path = self.config_path();
        let base_dir = self.connection.base_directory();

        if !base_dir.exists() {
            fs::create_dir_all(&base_dir)?;
            info!("Created base data directory: {:?}", base_dir);
        }

        let yaml_content = serde_yaml::to_string(config)?;

        let temp_path = config_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &config_path)?;

        debug!("Saved tracker config to {:?}", config_path);
        Ok(())
    }
}

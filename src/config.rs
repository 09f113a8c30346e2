//! Application configuration, read from a TOML file
//!
//! ```toml
//! data_dir = "/home/me/.local/share/pocket-classroom"
//! namespace = "pocket-classroom"
//! pretty_json = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::{FileBackend, RecordStore, StorageError};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where record namespaces live (default: platform data dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Directory name under `data_dir` holding this library's records
    pub namespace: String,
    /// Pretty-print stored JSON
    pub pretty_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            namespace: "pocket-classroom".to_string(),
            pretty_json: true,
        }
    }
}

impl Config {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pocket-classroom").join("config.toml"))
    }

    pub fn resolved_data_dir(&self) -> Result<PathBuf, StorageError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => FileBackend::default_data_dir(),
        }
    }

    /// Open the record store this config points at
    pub fn open_store(&self) -> Result<RecordStore, StorageError> {
        let data_dir = self.resolved_data_dir()?;
        let store = RecordStore::open_dir(&data_dir, &self.namespace)?;
        Ok(store.with_pretty_json(self.pretty_json))
    }
}

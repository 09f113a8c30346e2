//! JSON record layer over a [`RecordBackend`]
//!
//! Three record kinds share one namespace:
//! - `index`            the capsule summary list
//! - `capsule:{id}`     a full capsule
//! - `progress:{id}`    per-capsule study progress

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::backend::{RecordBackend, Result};
use super::file_storage::FileBackend;
use super::memory::MemoryBackend;

pub const INDEX_KEY: &str = "index";
const CAPSULE_KEY_PREFIX: &str = "capsule:";
const PROGRESS_KEY_PREFIX: &str = "progress:";

/// Storage key for a capsule by its id
pub fn capsule_key(id: &str) -> String {
    format!("{}{}", CAPSULE_KEY_PREFIX, id)
}

/// Storage key for progress by capsule id
pub fn progress_key(id: &str) -> String {
    format!("{}{}", PROGRESS_KEY_PREFIX, id)
}

/// Extract the capsule id from a `capsule:{id}` key
pub fn capsule_id_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(CAPSULE_KEY_PREFIX).filter(|id| !id.is_empty())
}

/// Typed JSON access to a shared backend
///
/// Cloning is cheap; clones share the same backend.
#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn RecordBackend>,
    pretty: bool,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn RecordBackend>) -> Self {
        Self {
            backend,
            pretty: true,
        }
    }

    /// Store backed by files under `{data_dir}/{namespace}`
    pub fn open_dir(data_dir: &Path, namespace: &str) -> Result<Self> {
        let backend = FileBackend::open(data_dir, namespace)?;
        Ok(Self::new(Arc::new(backend)))
    }

    /// Scratch store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Write compact instead of pretty-printed JSON
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Read and parse a record.
    ///
    /// Stored text that does not parse as `T` is logged and reported as
    /// absent. Only medium failures surface as errors.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                log::debug!("Read record {}", key);
                Ok(Some(value))
            }
            Err(e) => {
                log::error!("Corrupt record {}: {}", key, e);
                Ok(None)
            }
        }
    }

    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        self.backend.set(key, &json)?;
        log::debug!("Wrote record {} ({} bytes)", key, json.len());
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.backend.remove(key)
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.backend.get(key)?.is_some())
    }

    /// Ids of every capsule record present, regardless of the index
    pub fn capsule_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .backend
            .keys()?
            .iter()
            .filter_map(|k| capsule_id_from_key(k))
            .map(str::to_string)
            .collect())
    }

    /// Raw write, bypassing serialization
    pub fn write_raw(&self, key: &str, raw: &str) -> Result<()> {
        self.backend.set(key, raw)
    }
}

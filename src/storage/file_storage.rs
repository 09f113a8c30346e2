use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::backend::{RecordBackend, Result};

#[derive(Error, Debug)]
pub enum StorageError {
    /// The medium refused the operation (disk full, permissions, missing mount)
    #[error("Storage unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data directory not found")]
    DataDirNotFound,
}

/// File-per-key backend
///
/// Directory structure:
/// ```text
/// {data_dir}/{namespace}/
/// ├── index.json
/// ├── capsule%3A{id}.json
/// └── progress%3A{id}.json
/// ```
pub struct FileBackend {
    base_path: PathBuf,
}

impl FileBackend {
    /// Open (and create if needed) the namespace directory under `data_dir`
    pub fn open(data_dir: &Path, namespace: &str) -> Result<Self> {
        let base_path = data_dir.join(namespace);
        fs::create_dir_all(&base_path)?;
        log::debug!("Opened record namespace at {:?}", base_path);
        Ok(Self { base_path })
    }

    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("pocket-classroom"))
            .ok_or(StorageError::DataDirNotFound)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_path
            .join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl RecordBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        Ok(Some(content))
    }

    /// Atomic per key: write to `.tmp` then rename over the target
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();

        if !self.base_path.exists() {
            return Ok(keys);
        }

        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let path = entry.path();

            // `.json.tmp` leftovers have extension "tmp" and are skipped here
            if !path.is_file() || path.extension().map_or(true, |e| e != "json") {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match urlencoding::decode(stem) {
                Ok(key) => keys.push(key.into_owned()),
                Err(e) => log::warn!("Skipping undecodable record file {:?}: {}", path, e),
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_backend() -> (FileBackend, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::open(temp_dir.path(), "test-ns").unwrap();
        (backend, temp_dir)
    }

    #[test]
    fn test_set_get_remove() {
        let (backend, _temp) = create_test_backend();

        assert!(backend.get("capsule:abc").unwrap().is_none());

        backend.set("capsule:abc", "{\"a\":1}").unwrap();
        assert_eq!(backend.get("capsule:abc").unwrap().as_deref(), Some("{\"a\":1}"));

        backend.set("capsule:abc", "{\"a\":2}").unwrap();
        assert_eq!(backend.get("capsule:abc").unwrap().as_deref(), Some("{\"a\":2}"));

        backend.remove("capsule:abc").unwrap();
        assert!(backend.get("capsule:abc").unwrap().is_none());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let (backend, _temp) = create_test_backend();
        backend.remove("never-written").unwrap();
    }

    #[test]
    fn test_keys_round_trip_through_file_names() {
        let (backend, _temp) = create_test_backend();

        backend.set("index", "[]").unwrap();
        backend.set("capsule:x/y", "{}").unwrap();
        backend.set("progress:x/y", "{}").unwrap();

        let keys = backend.keys().unwrap();
        assert_eq!(keys, vec!["capsule:x/y", "index", "progress:x/y"]);
    }

    #[test]
    fn test_keys_ignore_tmp_files() {
        let (backend, _temp) = create_test_backend();

        backend.set("index", "[]").unwrap();
        fs::write(backend.base_path().join("index.json.tmp"), "partial").unwrap();

        assert_eq!(backend.keys().unwrap(), vec!["index"]);
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let temp_dir = TempDir::new().unwrap();
        let a = FileBackend::open(temp_dir.path(), "a").unwrap();
        let b = FileBackend::open(temp_dir.path(), "b").unwrap();

        a.set("index", "[1]").unwrap();
        assert!(b.get("index").unwrap().is_none());
    }

    #[test]
    fn test_medium_failure_is_unavailable() {
        let (backend, _temp) = create_test_backend();

        fs::remove_dir_all(backend.base_path()).unwrap();
        fs::write(backend.base_path(), "not a directory").unwrap();

        assert!(matches!(
            backend.set("index", "[]"),
            Err(StorageError::Unavailable(_))
        ));
        assert!(matches!(backend.keys(), Err(StorageError::Unavailable(_))));
    }
}

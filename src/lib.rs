pub mod capsules;
pub mod config;
pub mod library;
pub mod progress;
pub mod storage;
pub mod study;

use capsules::CapsuleStorage;
use config::Config;
use library::Library;
use progress::ProgressTracker;
use storage::{RecordStore, StorageError};

/// The storages every front end needs, all sharing one record store
pub struct AppState {
    pub store: RecordStore,
    pub capsules: CapsuleStorage,
    pub progress: ProgressTracker,
    pub library: Library,
}

impl AppState {
    pub fn new(store: RecordStore) -> Self {
        Self {
            capsules: CapsuleStorage::new(store.clone()),
            progress: ProgressTracker::new(store.clone()),
            library: Library::new(store.clone()),
            store,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, StorageError> {
        let store = config.open_store()?;
        log::info!(
            "Using capsule library '{}' in {:?}",
            config.namespace,
            config.resolved_data_dir()?
        );
        Ok(Self::new(store))
    }
}

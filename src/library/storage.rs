//! Library overview
//!
//! Reads only the index and progress records; capsule bodies stay on disk.

use super::models::LibraryCard;
use crate::capsules::IndexManager;
use crate::progress::ProgressTracker;
use crate::storage::{RecordStore, StorageError};

/// Read-only view over the capsule library
pub struct Library {
    index: IndexManager,
    progress: ProgressTracker,
}

impl Library {
    pub fn new(store: RecordStore) -> Self {
        Self {
            index: IndexManager::new(store.clone()),
            progress: ProgressTracker::new(store),
        }
    }

    /// Every capsule, most recently updated first, with its progress summary
    pub fn overview(&self) -> Result<Vec<LibraryCard>, StorageError> {
        let entries = self.index.sorted_by_recent()?;

        let mut cards = Vec::with_capacity(entries.len());
        for entry in entries {
            let progress = self.progress.load(&entry.id)?;
            cards.push(LibraryCard {
                best_score: progress.best_score,
                known_cards: progress.known_count(),
                entry,
            });
        }

        Ok(cards)
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.index.read_index()?.is_empty())
    }
}

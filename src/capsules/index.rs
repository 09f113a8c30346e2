//! Capsule index: a denormalized summary list kept beside the capsule records
//!
//! Every mutation is a full read followed by a full write. Two writers sharing
//! one store can therefore lose each other's index changes (last write wins);
//! [`IndexManager::rebuild`] recomputes the list from the capsule records when
//! that happens.

use serde_json::Value;

use super::models::{Capsule, IndexEntry};
use crate::storage::{capsule_key, RecordStore, StorageError, INDEX_KEY};

type Result<T> = std::result::Result<T, StorageError>;

pub struct IndexManager {
    store: RecordStore,
}

impl IndexManager {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Entries in insertion order. Missing or corrupt index reads as empty;
    /// single entries that cannot be read (no id, not an object) are skipped.
    pub fn read_index(&self) -> Result<Vec<IndexEntry>> {
        let raw = self
            .store
            .read::<Vec<Value>>(INDEX_KEY)?
            .unwrap_or_default();

        Ok(raw
            .into_iter()
            .filter_map(|v| match serde_json::from_value::<IndexEntry>(v) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping unreadable index entry: {}", e);
                    None
                }
            })
            .collect())
    }

    /// Overwrite the whole index
    pub fn write_index(&self, entries: &[IndexEntry]) -> Result<()> {
        self.store.write(INDEX_KEY, entries)
    }

    /// Replace the entry with the same id, or append
    pub fn upsert(&self, entry: IndexEntry) -> Result<()> {
        let mut entries = self.read_index()?;
        match entries.iter().position(|e| e.id == entry.id) {
            Some(pos) => entries[pos] = entry,
            None => entries.push(entry),
        }
        self.write_index(&entries)
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        let mut entries = self.read_index()?;
        entries.retain(|e| e.id != id);
        self.write_index(&entries)
    }

    /// Entries sorted by most recently updated first
    pub fn sorted_by_recent(&self) -> Result<Vec<IndexEntry>> {
        let mut entries = self.read_index()?;
        entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(entries)
    }

    /// Recompute the index from the capsule records actually stored.
    ///
    /// Entries are kept in their existing order where possible; capsules with
    /// no entry are appended, entries with no capsule are dropped.
    pub fn rebuild(&self) -> Result<Vec<IndexEntry>> {
        let existing = self.read_index()?;
        let mut ids = self.store.capsule_ids()?;
        ids.sort_by_key(|id| {
            existing
                .iter()
                .position(|e| &e.id == id)
                .unwrap_or(usize::MAX)
        });

        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            match self.store.read::<Capsule>(&capsule_key(&id))? {
                Some(capsule) => entries.push(IndexEntry::from_capsule(&id, &capsule)),
                None => log::warn!("Not indexing unreadable capsule {}", id),
            }
        }

        let dropped = existing
            .iter()
            .filter(|e| !entries.iter().any(|n| n.id == e.id))
            .count();
        log::info!(
            "Rebuilt capsule index: {} entries, {} stale entries dropped",
            entries.len(),
            dropped
        );

        self.write_index(&entries)?;
        Ok(entries)
    }
}

use super::models::ProgressRecord;
use crate::storage::{progress_key, RecordStore, StorageError};

type Result<T> = std::result::Result<T, StorageError>;

/// Reads and writes `progress:{id}` records
pub struct ProgressTracker {
    store: RecordStore,
}

impl ProgressTracker {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Stored progress, or the zero record when none exists (or it is corrupt)
    pub fn load(&self, id: &str) -> Result<ProgressRecord> {
        Ok(self
            .store
            .read::<ProgressRecord>(&progress_key(id))?
            .unwrap_or_default())
    }

    pub fn save(&self, id: &str, record: &ProgressRecord) -> Result<()> {
        self.store.write(&progress_key(id), record)
    }

    /// Delete the record; the next load returns the zero record
    pub fn clear(&self, id: &str) -> Result<()> {
        self.store.remove(&progress_key(id))
    }

    pub fn mark_known(&self, id: &str, card_index: usize) -> Result<ProgressRecord> {
        let mut record = self.load(id)?;
        record.known_flashcards.insert(card_index);
        self.save(id, &record)?;
        Ok(record)
    }

    pub fn mark_unknown(&self, id: &str, card_index: usize) -> Result<ProgressRecord> {
        let mut record = self.load(id)?;
        record.known_flashcards.remove(&card_index);
        self.save(id, &record)?;
        Ok(record)
    }

    /// Keep `percentage` if it beats the stored best. Returns whether it did;
    /// nothing is written otherwise.
    pub fn record_quiz_result(&self, id: &str, percentage: u32) -> Result<bool> {
        let percentage = percentage.min(100);
        let mut record = self.load(id)?;
        if percentage <= record.best_score {
            return Ok(false);
        }

        record.best_score = percentage;
        self.save(id, &record)?;
        log::info!("New best quiz score for {}: {}%", id, percentage);
        Ok(true)
    }
}

//! Capsule lifecycle: create, read, update, delete, import and export
//!
//! Every mutation keeps the index in step with the capsule records. Writes go
//! capsule first, then progress, then index; there is no transaction, so a
//! failure part-way leaves the index stale until [`CapsuleStorage::rebuild_index`].

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;

use super::index::IndexManager;
use super::models::*;
use crate::progress::ProgressTracker;
use crate::storage::{capsule_key, RecordStore, StorageError};

#[derive(Error, Debug)]
pub enum CapsuleError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("{0}")]
    ValidationFailed(String),

    #[error("Unsupported file type: schema {}", .0.as_deref().unwrap_or("missing"))]
    UnsupportedSchema(Option<String>),

    #[error("Missing title in capsule")]
    MissingTitle,

    #[error("Malformed capsule: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, CapsuleError>;

const ID_PREFIX: &str = "capsule_";

/// Last millisecond value handed out by [`CapsuleStorage::generate_id`]
static LAST_ISSUED_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Check the persistence invariant: a title and at least one content section
pub fn validate_capsule(capsule: &Capsule) -> Result<()> {
    if capsule.meta.title.trim().is_empty() {
        return Err(CapsuleError::ValidationFailed("Title is required".to_string()));
    }
    if !capsule.has_content() {
        return Err(CapsuleError::ValidationFailed(
            "Add at least notes, flashcards, or quiz".to_string(),
        ));
    }
    if let Some(pos) = capsule.quiz.iter().position(|q| q.choices.len() > MAX_CHOICES) {
        return Err(CapsuleError::ValidationFailed(format!(
            "Question {} has more than {} choices",
            pos + 1,
            MAX_CHOICES
        )));
    }
    if let Some(pos) = capsule.quiz.iter().position(|q| q.answer >= q.choices.len()) {
        return Err(CapsuleError::ValidationFailed(format!(
            "Question {} has no choice matching its answer",
            pos + 1
        )));
    }
    Ok(())
}

/// Shallow copy with the schema tag forced to the current version
pub fn export_capsule(capsule: &Capsule) -> Capsule {
    let mut out = capsule.clone();
    out.schema = Some(SCHEMA.to_string());
    out
}

fn is_supported_schema(schema: &str) -> bool {
    schema == SCHEMA || LEGACY_SCHEMAS.contains(&schema)
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Storage manager for capsule operations
pub struct CapsuleStorage {
    store: RecordStore,
    index: IndexManager,
    progress: ProgressTracker,
}

impl CapsuleStorage {
    pub fn new(store: RecordStore) -> Self {
        Self {
            index: IndexManager::new(store.clone()),
            progress: ProgressTracker::new(store.clone()),
            store,
        }
    }

    pub fn index(&self) -> &IndexManager {
        &self.index
    }

    /// Mint a new id: `capsule_` followed by the base-36 creation millisecond.
    ///
    /// Millisecond values never repeat within a process, and ids already
    /// present in the store are skipped.
    pub fn generate_id(&self) -> Result<String> {
        loop {
            let now = Utc::now().timestamp_millis();
            let prev = LAST_ISSUED_MILLIS
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                    Some(now.max(last + 1))
                })
                .unwrap_or(now);
            let millis = now.max(prev + 1);

            let id = format!("{}{}", ID_PREFIX, to_base36(millis.max(0) as u64));
            if !self.store.contains(&capsule_key(&id))? {
                return Ok(id);
            }
            log::debug!("Capsule id {} already taken, trying the next one", id);
        }
    }

    // ==================== Lifecycle ====================

    /// Persist `capsule` under `id` and upsert its index entry.
    ///
    /// The stored record carries `id` and a fresh `updatedAt`; everything else
    /// is written as given. Saving an existing id replaces it entirely.
    pub fn save(&self, id: &str, capsule: &Capsule) -> Result<Capsule> {
        if id.is_empty() {
            return Err(CapsuleError::InvalidArgument("id required"));
        }

        let mut stored = capsule.clone();
        stored.id = id.to_string();
        stored.meta.updated_at = Some(Utc::now());

        self.store.write(&capsule_key(id), &stored)?;
        self.index.upsert(IndexEntry::from_capsule(id, &stored))?;

        Ok(stored)
    }

    /// Validate, assign an id when missing, then save
    pub fn create(&self, capsule: &Capsule) -> Result<Capsule> {
        validate_capsule(capsule)?;

        let id = if capsule.id.is_empty() {
            self.generate_id()?
        } else {
            capsule.id.clone()
        };

        let stored = self.save(&id, capsule)?;
        log::info!("Saved capsule '{}' as {}", stored.meta.title, id);
        Ok(stored)
    }

    /// Read a capsule. Absent when missing or unreadable.
    pub fn load(&self, id: &str) -> Result<Option<Capsule>> {
        if id.is_empty() {
            return Ok(None);
        }
        Ok(self.store.read::<Capsule>(&capsule_key(id))?)
    }

    /// Remove the capsule, its progress and its index entry
    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.remove(&capsule_key(id))?;
        self.progress.clear(id)?;
        self.index.remove(id)?;
        log::info!("Deleted capsule {}", id);
        Ok(())
    }

    /// Index entries, most recently updated first
    pub fn list(&self) -> Result<Vec<IndexEntry>> {
        Ok(self.index.sorted_by_recent()?)
    }

    /// Recompute the index from the stored capsules
    pub fn rebuild_index(&self) -> Result<usize> {
        Ok(self.index.rebuild()?.len())
    }

    // ==================== Interchange ====================

    pub fn export(&self, capsule: &Capsule) -> Capsule {
        export_capsule(capsule)
    }

    /// Pretty JSON of the exported capsule
    pub fn export_json(&self, capsule: &Capsule) -> Result<String> {
        Ok(serde_json::to_string_pretty(&export_capsule(capsule))?)
    }

    /// Import a parsed interchange object as a brand-new capsule.
    ///
    /// The source id is ignored; a fresh one is always minted. Nothing is
    /// written unless every check passes.
    pub fn import(&self, raw: &Value) -> Result<Capsule> {
        let schema = raw.get("schema").and_then(Value::as_str);
        if !schema.map_or(false, is_supported_schema) {
            return Err(CapsuleError::UnsupportedSchema(schema.map(str::to_string)));
        }

        let has_title = raw
            .pointer("/meta/title")
            .and_then(Value::as_str)
            .map_or(false, |t| !t.trim().is_empty());
        if !has_title {
            return Err(CapsuleError::MissingTitle);
        }

        let capsule: Capsule = serde_json::from_value(raw.clone())?;
        let id = self.generate_id()?;
        let stored = self.save(&id, &capsule)?;

        log::info!("Imported capsule '{}' as {}", stored.meta.title, id);
        Ok(stored)
    }

    /// Parse interchange text, then [`import`](Self::import) it
    pub fn import_json(&self, text: &str) -> Result<Capsule> {
        let raw: Value = serde_json::from_str(text)?;
        self.import(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressRecord;
    use crate::storage::{progress_key, INDEX_KEY};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_storage() -> (CapsuleStorage, RecordStore) {
        let store = RecordStore::in_memory();
        (CapsuleStorage::new(store.clone()), store)
    }

    fn algebra() -> Capsule {
        Capsule::new("Algebra").with_flashcards(vec![Flashcard::new("2+2", "4")])
    }

    fn full_capsule() -> Capsule {
        let mut capsule = Capsule::new("Cells")
            .with_notes(vec!["Cells have membranes".into(), "Mitochondria".into()])
            .with_flashcards(vec![Flashcard::new("ATP", "Energy currency")])
            .with_quiz(vec![QuizQuestion::new(
                "Powerhouse?",
                vec!["Nucleus".into(), "Mitochondria".into()],
                1,
            )]);
        capsule.meta.subject = "Biology".to_string();
        capsule.meta.level = "Intermediate".to_string();
        capsule.meta.description = "Intro".to_string();
        capsule
    }

    #[test]
    fn test_save_requires_id() {
        let (storage, store) = create_test_storage();
        let err = storage.save("", &algebra()).unwrap_err();
        assert!(matches!(err, CapsuleError::InvalidArgument(_)));
        assert!(store.capsule_ids().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let (storage, _store) = create_test_storage();
        let original = full_capsule();

        storage.save("capsule_x", &original).unwrap();
        let mut loaded = storage.load("capsule_x").unwrap().unwrap();

        assert!(loaded.meta.updated_at.is_some());
        loaded.meta.updated_at = None;
        assert_eq!(loaded.id, "capsule_x");
        loaded.id = String::new();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_save_twice_replaces_content_and_index() {
        let (storage, _store) = create_test_storage();

        storage.save("capsule_x", &algebra()).unwrap();
        let replacement = Capsule::new("Geometry").with_notes(vec!["Angles".into()]);
        storage.save("capsule_x", &replacement).unwrap();

        let loaded = storage.load("capsule_x").unwrap().unwrap();
        assert_eq!(loaded.meta.title, "Geometry");
        assert!(loaded.flashcards.is_empty());

        let entries = storage.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Geometry");
    }

    #[test]
    fn test_save_then_delete_scenario() {
        let (storage, _store) = create_test_storage();

        storage.save("capsule_a", &algebra()).unwrap();
        let entries = storage.index().read_index().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Algebra");

        storage.delete("capsule_a").unwrap();
        assert!(storage.index().read_index().unwrap().is_empty());
        assert!(storage.load("capsule_a").unwrap().is_none());
    }

    #[test]
    fn test_delete_cascades_to_progress() {
        let (storage, store) = create_test_storage();
        let tracker = ProgressTracker::new(store.clone());

        storage.save("capsule_a", &algebra()).unwrap();
        tracker.mark_known("capsule_a", 0).unwrap();
        tracker.record_quiz_result("capsule_a", 80).unwrap();

        storage.delete("capsule_a").unwrap();

        assert!(!store.contains(&progress_key("capsule_a")).unwrap());
        assert_eq!(tracker.load("capsule_a").unwrap(), ProgressRecord::default());
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let (storage, _store) = create_test_storage();
        storage.save("capsule_a", &algebra()).unwrap();

        storage.delete("capsule_missing").unwrap();
        assert_eq!(storage.list().unwrap().len(), 1);
    }

    #[test]
    fn test_index_tracks_save_delete_sequences() {
        let (storage, store) = create_test_storage();

        storage.save("a", &algebra()).unwrap();
        storage.save("b", &full_capsule()).unwrap();
        storage.save("c", &algebra()).unwrap();
        storage.delete("b").unwrap();
        storage.save("a", &full_capsule()).unwrap();
        storage.delete("zzz").unwrap();
        storage.save("d", &algebra()).unwrap();
        storage.delete("c").unwrap();

        let mut indexed: Vec<String> = storage
            .index()
            .read_index()
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        indexed.sort();
        assert_eq!(indexed, vec!["a", "d"]);
        assert_eq!(store.capsule_ids().unwrap(), vec!["a", "d"]);
    }

    #[test]
    fn test_load_corrupt_capsule_is_absent() {
        let (storage, store) = create_test_storage();
        store.write_raw(&capsule_key("broken"), "{\"meta\": ").unwrap();
        assert!(storage.load("broken").unwrap().is_none());
    }

    #[test]
    fn test_load_partial_capsule() {
        let (storage, store) = create_test_storage();
        store.write_raw(&capsule_key("partial"), "{\"notes\": [\"only a note\"]}").unwrap();

        let capsule = storage.load("partial").unwrap().unwrap();
        assert_eq!(capsule.meta.title, "");
        assert_eq!(capsule.notes, vec!["only a note"]);
    }

    #[test]
    fn test_create_validates() {
        let (storage, store) = create_test_storage();

        let err = storage.create(&Capsule::new("  ").with_notes(vec!["n".into()])).unwrap_err();
        assert_eq!(err.to_string(), "Title is required");

        let err = storage.create(&Capsule::new("Empty")).unwrap_err();
        assert_eq!(err.to_string(), "Add at least notes, flashcards, or quiz");

        let too_many = Capsule::new("Quiz").with_quiz(vec![QuizQuestion::new(
            "Q",
            vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()],
            0,
        )]);
        assert!(matches!(
            storage.create(&too_many).unwrap_err(),
            CapsuleError::ValidationFailed(_)
        ));

        let unanswerable = Capsule::new("Quiz").with_quiz(vec![QuizQuestion::new(
            "Q",
            vec!["a".into(), "b".into()],
            2,
        )]);
        let err = storage.create(&unanswerable).unwrap_err();
        assert_eq!(err.to_string(), "Question 1 has no choice matching its answer");

        let no_choices = Capsule::new("Quiz").with_quiz(vec![QuizQuestion::new("Q", vec![], 0)]);
        assert!(matches!(
            storage.create(&no_choices).unwrap_err(),
            CapsuleError::ValidationFailed(_)
        ));

        assert!(store.capsule_ids().unwrap().is_empty());
        assert!(!store.contains(INDEX_KEY).unwrap());
    }

    #[test]
    fn test_create_mints_id() {
        let (storage, _store) = create_test_storage();

        let stored = storage.create(&algebra()).unwrap();
        assert!(stored.id.starts_with("capsule_"));
        assert!(storage.load(&stored.id).unwrap().is_some());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let (storage, _store) = create_test_storage();

        let mut ids: Vec<String> = (0..50).map(|_| storage.generate_id().unwrap()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_generate_id_skips_taken_ids() {
        let (storage, store) = create_test_storage();

        let first = storage.generate_id().unwrap();
        store.write_raw(&capsule_key(&first), "{}").unwrap();
        let second = storage.generate_id().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn test_export_forces_schema() {
        let (storage, _store) = create_test_storage();
        let mut capsule = algebra();
        capsule.schema = Some("something/else".to_string());

        let out = storage.export(&capsule);
        assert_eq!(out.schema.as_deref(), Some(SCHEMA));
        assert_eq!(out.meta, capsule.meta);
        assert_eq!(capsule.schema.as_deref(), Some("something/else"));
    }

    #[test]
    fn test_import_export_round_trip() {
        let (storage, _store) = create_test_storage();
        let original = full_capsule();

        let saved = storage.save("capsule_src", &original).unwrap();
        let text = storage.export_json(&saved).unwrap();
        let imported = storage.import_json(&text).unwrap();

        assert_ne!(imported.id, "capsule_src");
        let mut content = storage.load(&imported.id).unwrap().unwrap();
        content.id = String::new();
        content.meta.updated_at = None;
        content.schema = None;
        assert_eq!(content, original);
        assert_eq!(storage.list().unwrap().len(), 2);
    }

    #[test]
    fn test_import_rejects_unknown_schema() {
        let (storage, store) = create_test_storage();
        let raw = json!({
            "schema": "other/v9",
            "meta": { "title": "Nope" },
            "notes": ["n"]
        });

        let err = storage.import(&raw).unwrap_err();
        assert!(matches!(err, CapsuleError::UnsupportedSchema(Some(ref s)) if s == "other/v9"));
        assert!(store.capsule_ids().unwrap().is_empty());
        assert!(!store.contains(INDEX_KEY).unwrap());
    }

    #[test]
    fn test_import_rejects_missing_schema() {
        let (storage, _store) = create_test_storage();
        let err = storage.import(&json!({ "meta": { "title": "T" } })).unwrap_err();
        assert!(matches!(err, CapsuleError::UnsupportedSchema(None)));
    }

    #[test]
    fn test_import_accepts_legacy_schema() {
        let (storage, _store) = create_test_storage();
        let raw = json!({
            "schema": LEGACY_SCHEMAS[0],
            "meta": { "title": "Old" },
            "notes": ["n"]
        });
        let imported = storage.import(&raw).unwrap();
        assert_eq!(imported.meta.title, "Old");
    }

    #[test]
    fn test_import_requires_title() {
        let (storage, store) = create_test_storage();

        let err = storage.import(&json!({ "schema": SCHEMA, "notes": ["n"] })).unwrap_err();
        assert!(matches!(err, CapsuleError::MissingTitle));

        let err = storage
            .import(&json!({ "schema": SCHEMA, "meta": { "title": "" } }))
            .unwrap_err();
        assert!(matches!(err, CapsuleError::MissingTitle));
        assert!(store.capsule_ids().unwrap().is_empty());
    }

    #[test]
    fn test_import_never_overwrites_existing() {
        let (storage, _store) = create_test_storage();
        storage.save("capsule_same", &algebra()).unwrap();

        let raw = json!({
            "id": "capsule_same",
            "schema": SCHEMA,
            "meta": { "title": "Intruder" },
            "notes": ["n"]
        });
        let imported = storage.import(&raw).unwrap();

        assert_ne!(imported.id, "capsule_same");
        assert_eq!(storage.load("capsule_same").unwrap().unwrap().meta.title, "Algebra");
    }

    #[test]
    fn test_import_json_rejects_garbage() {
        let (storage, store) = create_test_storage();
        let err = storage.import_json("not json at all").unwrap_err();
        assert!(matches!(err, CapsuleError::Malformed(_)));
        assert!(store.capsule_ids().unwrap().is_empty());
    }

    #[test]
    fn test_load_tolerates_null_fields() {
        let (storage, store) = create_test_storage();
        store
            .write_raw(
                &capsule_key("hand_edited"),
                r#"{"id": "hand_edited", "meta": {"title": "Edited", "subject": null},
                    "notes": ["n"], "flashcards": null, "quiz": null}"#,
            )
            .unwrap();

        let capsule = storage.load("hand_edited").unwrap().unwrap();
        assert_eq!(capsule.meta.title, "Edited");
        assert_eq!(capsule.meta.subject, "");
        assert!(capsule.flashcards.is_empty());
        assert!(capsule.quiz.is_empty());

        storage.delete("hand_edited").unwrap();
        assert!(storage.load("hand_edited").unwrap().is_none());
    }

    #[test]
    fn test_import_tolerates_null_and_mistyped_fields() {
        let (storage, _store) = create_test_storage();
        let raw = json!({
            "schema": SCHEMA,
            "meta": { "title": "T", "subject": null, "level": null },
            "notes": ["n"],
            "flashcards": null,
            "quiz": [{ "question": "Q", "choices": ["a", "b"], "answer": -1 }]
        });

        let imported = storage.import(&raw).unwrap();
        assert_eq!(imported.meta.subject, "");
        assert_eq!(imported.meta.level, DEFAULT_LEVEL);
        assert!(imported.flashcards.is_empty());
        assert_eq!(imported.quiz[0].answer, 0);
        assert!(storage.load(&imported.id).unwrap().is_some());
    }

    #[test]
    fn test_index_entry_without_timestamp_is_not_lost() {
        let (storage, store) = create_test_storage();
        storage.save("a", &algebra()).unwrap();
        storage.save("b", &algebra()).unwrap();

        let mut raw: Vec<Value> = store.read(INDEX_KEY).unwrap().unwrap();
        raw[0].as_object_mut().unwrap().remove("updatedAt");
        store.write(INDEX_KEY, &raw).unwrap();

        storage.save("c", &algebra()).unwrap();

        let mut ids: Vec<String> = storage.list().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids.last().map(String::as_str), Some("a"));
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(store.capsule_ids().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unavailable_medium_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let storage = CapsuleStorage::new(RecordStore::open_dir(temp_dir.path(), "ns").unwrap());

        // Namespace directory replaced by a plain file after opening
        let ns = temp_dir.path().join("ns");
        fs::remove_dir_all(&ns).unwrap();
        fs::write(&ns, "not a directory").unwrap();

        let err = storage.save("capsule_a", &algebra()).unwrap_err();
        assert!(matches!(
            err,
            CapsuleError::Storage(StorageError::Unavailable(_))
        ));
        assert!(matches!(
            storage.rebuild_index().unwrap_err(),
            CapsuleError::Storage(StorageError::Unavailable(_))
        ));
    }
}

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::storage::lenient::{or_default, skip_invalid};

/// Mutable study state for one capsule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Best quiz percentage so far (0-100)
    #[serde(default, deserialize_with = "or_default")]
    pub best_score: u32,
    /// Indices of flashcards the learner marked as known
    #[serde(default, deserialize_with = "skip_invalid")]
    pub known_flashcards: BTreeSet<usize>,
}

impl ProgressRecord {
    pub fn known_count(&self) -> usize {
        self.known_flashcards.len()
    }

    pub fn is_known(&self, card_index: usize) -> bool {
        self.known_flashcards.contains(&card_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bad_card_indices_keep_the_best_score() {
        let record: ProgressRecord = serde_json::from_value(json!({
            "bestScore": 80,
            "knownFlashcards": [0, null, -2, "x", 3]
        }))
        .unwrap();

        assert_eq!(record.best_score, 80);
        assert_eq!(record.known_flashcards, BTreeSet::from([0, 3]));
    }

    #[test]
    fn test_null_fields_read_as_zero() {
        let record: ProgressRecord =
            serde_json::from_value(json!({ "bestScore": null, "knownFlashcards": null })).unwrap();
        assert_eq!(record, ProgressRecord::default());
    }
}

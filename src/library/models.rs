//! Library data models

use serde::{Deserialize, Serialize};

use crate::capsules::IndexEntry;

/// One capsule as shown in the library list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryCard {
    #[serde(flatten)]
    pub entry: IndexEntry,

    /// Best quiz percentage recorded for this capsule
    pub best_score: u32,

    /// Number of flashcards marked as known
    pub known_cards: usize,
}

//! Data models for study capsules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::storage::lenient::{or_default, seq_or_default};

/// Interchange format tag written on export
pub const SCHEMA: &str = "pocket-classroom/v1";

/// Older tags still accepted on import
pub const LEGACY_SCHEMAS: &[&str] = &["pocket-classroom/v0"];

/// A quiz question may offer at most this many choices
pub const MAX_CHOICES: usize = 4;

pub const DEFAULT_LEVEL: &str = "Beginner";

/// Title used in the index when a capsule has none
pub const UNTITLED: &str = "Untitled";

/// A complete unit of study content
///
/// Every field has a default so that partially-formed records (hand-edited
/// storage, older exports) still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capsule {
    #[serde(default, deserialize_with = "or_default")]
    pub id: String,
    #[serde(default, deserialize_with = "or_default")]
    pub meta: CapsuleMeta,
    #[serde(default, deserialize_with = "seq_or_default")]
    pub notes: Vec<String>,
    #[serde(default, deserialize_with = "seq_or_default")]
    pub flashcards: Vec<Flashcard>,
    #[serde(default, deserialize_with = "seq_or_default")]
    pub quiz: Vec<QuizQuestion>,
    #[serde(
        default,
        deserialize_with = "or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub schema: Option<String>,
    /// Fields this version does not know about, kept so saves are verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Capsule {
    fn default() -> Self {
        Self {
            id: String::new(),
            meta: CapsuleMeta::default(),
            notes: Vec::new(),
            flashcards: Vec::new(),
            quiz: Vec::new(),
            schema: None,
            extra: Map::new(),
        }
    }
}

impl Capsule {
    pub fn new(title: impl Into<String>) -> Self {
        let mut capsule = Self::default();
        capsule.meta.title = title.into();
        capsule
    }

    pub fn with_notes(mut self, notes: Vec<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_flashcards(mut self, flashcards: Vec<Flashcard>) -> Self {
        self.flashcards = flashcards;
        self
    }

    pub fn with_quiz(mut self, quiz: Vec<QuizQuestion>) -> Self {
        self.quiz = quiz;
        self
    }

    pub fn has_content(&self) -> bool {
        !self.notes.is_empty() || !self.flashcards.is_empty() || !self.quiz.is_empty()
    }
}

/// Descriptive metadata shown in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapsuleMeta {
    #[serde(default, deserialize_with = "or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "or_default")]
    pub subject: String,
    /// Open-ended level label ("Beginner", "Intermediate", "Advanced", ...)
    #[serde(default = "default_level", deserialize_with = "level_or_default")]
    pub level: String,
    #[serde(default, deserialize_with = "or_default")]
    pub description: String,
    /// Rewritten on every save
    #[serde(
        default,
        deserialize_with = "or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_level() -> String {
    DEFAULT_LEVEL.to_string()
}

/// A level that is not a string (including `null`) reads as the default
fn level_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(level) => Ok(level),
        _ => Ok(default_level()),
    }
}

impl Default for CapsuleMeta {
    fn default() -> Self {
        Self {
            title: String::new(),
            subject: String::new(),
            level: default_level(),
            description: String::new(),
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    #[serde(default, deserialize_with = "or_default")]
    pub front: String,
    #[serde(default, deserialize_with = "or_default")]
    pub back: String,
}

impl Flashcard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }
}

/// A multiple-choice question
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    #[serde(default, deserialize_with = "or_default")]
    pub question: String,
    #[serde(default, deserialize_with = "seq_or_default")]
    pub choices: Vec<String>,
    /// Index into `choices` of the correct answer
    #[serde(default, deserialize_with = "or_default")]
    pub answer: usize,
    #[serde(default, deserialize_with = "or_default")]
    pub explanation: String,
}

impl QuizQuestion {
    pub fn new(question: impl Into<String>, choices: Vec<String>, answer: usize) -> Self {
        Self {
            question: question.into(),
            choices,
            answer,
            explanation: String::new(),
        }
    }

    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.answer
    }
}

/// Denormalized summary of a capsule, one per stored capsule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub id: String,
    #[serde(default, deserialize_with = "or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "or_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "or_default")]
    pub level: String,
    /// Unix epoch when missing or unreadable, so such entries sort last
    #[serde(default = "epoch", deserialize_with = "time_or_epoch")]
    pub updated_at: DateTime<Utc>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn time_or_epoch<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(DateTime::<Utc>::deserialize(value).unwrap_or_else(|_| epoch()))
}

impl IndexEntry {
    /// Derive the summary for `capsule` stored under `id`
    pub fn from_capsule(id: &str, capsule: &Capsule) -> Self {
        let meta = &capsule.meta;
        let title = if meta.title.is_empty() {
            UNTITLED.to_string()
        } else {
            meta.title.clone()
        };

        Self {
            id: id.to_string(),
            title,
            subject: meta.subject.clone(),
            level: meta.level.clone(),
            updated_at: meta.updated_at.unwrap_or_else(Utc::now),
        }
    }
}

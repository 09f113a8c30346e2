use serde_json::{Map, Value};

use crate::capsules::{Capsule, CapsuleError, CapsuleMeta, CapsuleStorage, Flashcard, QuizQuestion};

/// Editing context for one capsule
///
/// Holds raw form data plus the id being edited. The first successful
/// [`commit`](Self::commit) of a new draft fixes its id, so later commits
/// update the same capsule.
#[derive(Debug, Clone, Default)]
pub struct AuthorDraft {
    id: Option<String>,
    pub meta: CapsuleMeta,
    /// One note per line
    pub notes_text: String,
    pub flashcards: Vec<Flashcard>,
    pub quiz: Vec<QuizQuestion>,
    extra: Map<String, Value>,
}

impl AuthorDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing an existing capsule
    pub fn for_edit(capsule: &Capsule) -> Self {
        Self {
            id: (!capsule.id.is_empty()).then(|| capsule.id.clone()),
            meta: capsule.meta.clone(),
            notes_text: capsule.notes.join("\n"),
            flashcards: capsule.flashcards.clone(),
            quiz: capsule.quiz.clone(),
            extra: capsule.extra.clone(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Normalized capsule from the form data: text trimmed, blank notes,
    /// cards and questions dropped
    pub fn to_capsule(&self) -> Capsule {
        let meta = CapsuleMeta {
            title: self.meta.title.trim().to_string(),
            subject: self.meta.subject.trim().to_string(),
            level: self.meta.level.clone(),
            description: self.meta.description.trim().to_string(),
            updated_at: self.meta.updated_at,
        };

        let notes = self
            .notes_text
            .lines()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();

        let flashcards = self
            .flashcards
            .iter()
            .map(|f| Flashcard::new(f.front.trim(), f.back.trim()))
            .filter(|f| !f.front.is_empty() || !f.back.is_empty())
            .collect();

        let quiz = self
            .quiz
            .iter()
            .filter(|q| !q.question.trim().is_empty())
            .map(|q| {
                let mut choices: Vec<String> = q.choices.iter().map(|c| c.trim().to_string()).collect();
                while choices.last().map_or(false, |c| c.is_empty()) {
                    choices.pop();
                }
                QuizQuestion {
                    question: q.question.trim().to_string(),
                    choices,
                    answer: q.answer,
                    explanation: q.explanation.trim().to_string(),
                }
            })
            .collect();

        Capsule {
            id: self.id.clone().unwrap_or_default(),
            meta,
            notes,
            flashcards,
            quiz,
            schema: None,
            extra: self.extra.clone(),
        }
    }

    /// Validate and store the draft
    pub fn commit(&mut self, capsules: &CapsuleStorage) -> Result<Capsule, CapsuleError> {
        let stored = capsules.create(&self.to_capsule())?;
        self.id = Some(stored.id.clone());
        self.meta.updated_at = stored.meta.updated_at;
        Ok(stored)
    }
}

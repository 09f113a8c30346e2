//! Studying a capsule
//!
//! This module provides:
//! - The quiz session state machine (sequential answers, score, best result)
//! - A flashcard cursor clamped to the card list
//! - `StudySession` and `AuthorDraft`, explicit per-view contexts for learning
//!   and editing a capsule

pub mod draft;
pub mod flashcards;
pub mod quiz;
pub mod session;

use thiserror::Error;

use crate::storage::StorageError;

pub use draft::AuthorDraft;
pub use flashcards::FlashcardCursor;
pub use quiz::{score_percentage, AnswerOutcome, QuizSession, QuizState};
pub use session::{StudySession, StudyTab};

#[derive(Error, Debug)]
pub enum StudyError {
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("No flashcards")]
    NoCards,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

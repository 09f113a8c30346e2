//! Quiz session state machine
//!
//! ```text
//! InProgress { index, correct } --answer/skip--> InProgress { index + 1, .. }
//!                               --last answer--> Finished { percentage, is_new_best }
//! ```

use serde::Serialize;

use super::StudyError;
use crate::capsules::QuizQuestion;
use crate::progress::ProgressTracker;

type Result<T> = std::result::Result<T, StudyError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum QuizState {
    #[serde(rename_all = "camelCase")]
    InProgress { index: usize, correct_count: usize },
    #[serde(rename_all = "camelCase")]
    Finished { percentage: u32, is_new_best: bool },
}

/// Result of a single answer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: usize,
    pub explanation: String,
    pub state: QuizState,
}

/// `round(correct / total * 100)`, 0 for an empty quiz
pub fn score_percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

/// One run through a capsule's quiz
#[derive(Debug, Clone)]
pub struct QuizSession {
    capsule_id: String,
    /// Snapshot taken at start; later edits to the capsule do not reach it
    questions: Vec<QuizQuestion>,
    state: QuizState,
}

impl QuizSession {
    /// Start a session. An empty quiz is finished immediately with 0%, which
    /// can never beat a stored best, so no progress lookup is needed.
    pub fn new(capsule_id: impl Into<String>, questions: Vec<QuizQuestion>) -> Self {
        let state = if questions.is_empty() {
            QuizState::Finished {
                percentage: 0,
                is_new_best: false,
            }
        } else {
            QuizState::InProgress {
                index: 0,
                correct_count: 0,
            }
        };

        Self {
            capsule_id: capsule_id.into(),
            questions,
            state,
        }
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, QuizState::Finished { .. })
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// The question awaiting an answer, if any
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        match self.state {
            QuizState::InProgress { index, .. } => self.questions.get(index),
            QuizState::Finished { .. } => None,
        }
    }

    /// Answer the current question with `choice` (an index into its choices)
    pub fn answer(&mut self, choice: usize, progress: &ProgressTracker) -> Result<AnswerOutcome> {
        let QuizState::InProgress {
            index,
            correct_count,
        } = self.state
        else {
            return Err(StudyError::InvalidState("quiz is already finished"));
        };
        let question = self
            .questions
            .get(index)
            .ok_or(StudyError::InvalidState("no question at the current index"))?;

        let correct = question.is_correct(choice);
        let correct_answer = question.answer;
        let explanation = question.explanation.clone();

        let correct_count = if correct { correct_count + 1 } else { correct_count };
        self.advance(index + 1, correct_count, progress)?;

        Ok(AnswerOutcome {
            correct,
            correct_answer,
            explanation,
            state: self.state,
        })
    }

    /// Move past the current question without answering; it counts as wrong
    pub fn skip(&mut self, progress: &ProgressTracker) -> Result<QuizState> {
        let QuizState::InProgress {
            index,
            correct_count,
        } = self.state
        else {
            return Err(StudyError::InvalidState("quiz is already finished"));
        };

        self.advance(index + 1, correct_count, progress)?;
        Ok(self.state)
    }

    fn advance(&mut self, next: usize, correct_count: usize, progress: &ProgressTracker) -> Result<()> {
        if next < self.questions.len() {
            self.state = QuizState::InProgress {
                index: next,
                correct_count,
            };
            return Ok(());
        }

        let percentage = score_percentage(correct_count, self.questions.len());
        let is_new_best = progress.record_quiz_result(&self.capsule_id, percentage)?;
        log::debug!(
            "Quiz for {} finished: {}/{} correct ({}%)",
            self.capsule_id,
            correct_count,
            self.questions.len(),
            percentage
        );

        self.state = QuizState::Finished {
            percentage,
            is_new_best,
        };
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

use super::flashcards::FlashcardCursor;
use super::quiz::{AnswerOutcome, QuizSession, QuizState};
use super::StudyError;
use crate::capsules::{Capsule, Flashcard};
use crate::progress::{ProgressRecord, ProgressTracker};

type Result<T> = std::result::Result<T, StudyError>;

/// The three ways of studying a capsule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StudyTab {
    Notes,
    Flashcards,
    Quiz,
}

impl StudyTab {
    pub const ALL: [StudyTab; 3] = [StudyTab::Notes, StudyTab::Flashcards, StudyTab::Quiz];

    fn position(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }
}

impl Default for StudyTab {
    fn default() -> Self {
        Self::Notes
    }
}

/// Everything needed to study one capsule
///
/// Each session owns its own copy of the capsule and its own cursor/quiz
/// state, so several sessions can be open side by side. Only progress is
/// shared, through the store.
pub struct StudySession {
    capsule: Capsule,
    tab: StudyTab,
    cursor: FlashcardCursor,
    quiz: QuizSession,
}

impl StudySession {
    pub fn new(capsule: Capsule) -> Self {
        let cursor = FlashcardCursor::new(capsule.flashcards.len());
        let quiz = QuizSession::new(capsule.id.clone(), capsule.quiz.clone());
        Self {
            capsule,
            tab: StudyTab::default(),
            cursor,
            quiz,
        }
    }

    pub fn capsule(&self) -> &Capsule {
        &self.capsule
    }

    pub fn tab(&self) -> StudyTab {
        self.tab
    }

    /// Switch tabs. Entering the quiz tab starts a fresh quiz.
    pub fn show_tab(&mut self, tab: StudyTab) {
        self.tab = tab;
        if tab == StudyTab::Quiz {
            self.restart_quiz();
        }
    }

    /// Move `step` tabs forward (negative for backward), wrapping around
    pub fn cycle_tab(&mut self, step: i32) -> StudyTab {
        let len = StudyTab::ALL.len() as i32;
        let next = (self.tab.position() as i32 + step).rem_euclid(len) as usize;
        self.show_tab(StudyTab::ALL[next]);
        self.tab
    }

    // ===== Notes =====

    pub fn notes(&self) -> &[String] {
        &self.capsule.notes
    }

    /// Notes containing `query`, ignoring case. A blank query matches all.
    pub fn filter_notes(&self, query: &str) -> Vec<&str> {
        let query = query.trim().to_lowercase();
        self.capsule
            .notes
            .iter()
            .filter(|n| query.is_empty() || n.to_lowercase().contains(&query))
            .map(String::as_str)
            .collect()
    }

    // ===== Flashcards =====

    pub fn cursor(&self) -> &FlashcardCursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut FlashcardCursor {
        &mut self.cursor
    }

    pub fn current_card(&self) -> Option<&Flashcard> {
        self.cursor
            .current()
            .and_then(|i| self.capsule.flashcards.get(i))
    }

    pub fn mark_current_known(&self, progress: &ProgressTracker) -> Result<ProgressRecord> {
        let index = self.cursor.current().ok_or(StudyError::NoCards)?;
        Ok(progress.mark_known(&self.capsule.id, index)?)
    }

    pub fn mark_current_unknown(&self, progress: &ProgressTracker) -> Result<ProgressRecord> {
        let index = self.cursor.current().ok_or(StudyError::NoCards)?;
        Ok(progress.mark_unknown(&self.capsule.id, index)?)
    }

    // ===== Quiz =====

    pub fn quiz(&self) -> &QuizSession {
        &self.quiz
    }

    /// Throw away the running quiz and start over from the capsule's questions
    pub fn restart_quiz(&mut self) {
        self.quiz = QuizSession::new(self.capsule.id.clone(), self.capsule.quiz.clone());
    }

    pub fn answer(&mut self, choice: usize, progress: &ProgressTracker) -> Result<AnswerOutcome> {
        self.quiz.answer(choice, progress)
    }

    pub fn skip_question(&mut self, progress: &ProgressTracker) -> Result<QuizState> {
        self.quiz.skip(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capsules::QuizQuestion;
    use crate::storage::RecordStore;

    fn sample() -> Capsule {
        let mut capsule = Capsule::new("Chemistry")
            .with_notes(vec![
                "Water is H2O".into(),
                "Salt is NaCl".into(),
                "water boils at 100C".into(),
            ])
            .with_flashcards(vec![Flashcard::new("H", "Hydrogen"), Flashcard::new("O", "Oxygen")])
            .with_quiz(vec![QuizQuestion::new("H2O?", vec!["Water".into(), "Salt".into()], 0)]);
        capsule.id = "capsule_chem".to_string();
        capsule
    }

    #[test]
    fn test_filter_notes() {
        let session = StudySession::new(sample());
        assert_eq!(
            session.filter_notes("WATER"),
            vec!["Water is H2O", "water boils at 100C"]
        );
        assert_eq!(session.filter_notes("  ").len(), 3);
        assert!(session.filter_notes("gold").is_empty());
    }

    #[test]
    fn test_cycle_tab_wraps() {
        let mut session = StudySession::new(sample());
        assert_eq!(session.tab(), StudyTab::Notes);
        assert_eq!(session.cycle_tab(1), StudyTab::Flashcards);
        assert_eq!(session.cycle_tab(1), StudyTab::Quiz);
        assert_eq!(session.cycle_tab(1), StudyTab::Notes);
        assert_eq!(session.cycle_tab(-1), StudyTab::Quiz);
    }

    #[test]
    fn test_mark_current_card() {
        let tracker = ProgressTracker::new(RecordStore::in_memory());
        let mut session = StudySession::new(sample());

        session.cursor_mut().next();
        assert_eq!(session.current_card().unwrap().front, "O");
        let record = session.mark_current_known(&tracker).unwrap();
        assert!(record.is_known(1));

        let record = session.mark_current_unknown(&tracker).unwrap();
        assert!(!record.is_known(1));
    }

    #[test]
    fn test_mark_without_cards() {
        let tracker = ProgressTracker::new(RecordStore::in_memory());
        let session = StudySession::new(Capsule::new("Notes only").with_notes(vec!["n".into()]));

        assert!(session.current_card().is_none());
        assert!(matches!(
            session.mark_current_known(&tracker),
            Err(StudyError::NoCards)
        ));
    }

    #[test]
    fn test_entering_quiz_tab_restarts() {
        let tracker = ProgressTracker::new(RecordStore::in_memory());
        let mut session = StudySession::new(sample());

        session.show_tab(StudyTab::Quiz);
        session.answer(0, &tracker).unwrap();
        assert!(session.quiz().is_finished());

        session.show_tab(StudyTab::Notes);
        session.show_tab(StudyTab::Quiz);
        assert!(!session.quiz().is_finished());
        assert_eq!(tracker.load("capsule_chem").unwrap().best_score, 100);
    }
}

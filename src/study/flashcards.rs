/// Position within a capsule's flashcards
///
/// Moves saturate at either end instead of wrapping. With no cards there is
/// no position at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardCursor {
    card_count: usize,
    index: usize,
    flipped: bool,
}

impl FlashcardCursor {
    pub fn new(card_count: usize) -> Self {
        Self {
            card_count,
            index: 0,
            flipped: false,
        }
    }

    /// Current card index, or `None` when there are no cards
    pub fn current(&self) -> Option<usize> {
        (self.card_count > 0).then_some(self.index)
    }

    pub fn card_count(&self) -> usize {
        self.card_count
    }

    pub fn next(&mut self) -> Option<usize> {
        if self.card_count > 0 && self.index + 1 < self.card_count {
            self.index += 1;
        }
        self.flipped = false;
        self.current()
    }

    pub fn prev(&mut self) -> Option<usize> {
        self.index = self.index.saturating_sub(1);
        self.flipped = false;
        self.current()
    }

    /// Show the other face of the current card
    pub fn flip(&mut self) -> bool {
        if self.card_count > 0 {
            self.flipped = !self.flipped;
        }
        self.flipped
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Point at a different card list, keeping the index in range
    pub fn reset(&mut self, card_count: usize) {
        self.card_count = card_count;
        self.index = self.index.min(card_count.saturating_sub(1));
        self.flipped = false;
    }

    /// One-based "i/n", or "0/0" without cards
    pub fn position_label(&self) -> String {
        match self.current() {
            Some(i) => format!("{}/{}", i + 1, self.card_count),
            None => "0/0".to_string(),
        }
    }
}

//! Wrapper for flashcards that tracks progress within one study session.
use super::{Flashcard, Grade};

#[derive(Clone, Debug)]
pub struct LearningCard {
    pub flashcard: Flashcard,
    pub is_learned: bool,
    pub last_grade: Option<Grade>,
}

impl LearningCard {
    pub fn new(flashcard: Flashcard) -> Self {
        Self {
            flashcard,
            is_learned: false,
            last_grade: None,
        }
    }

    /// Passing grades mark the card learned for the rest of the session.
    pub fn record_grade(&mut self, grade: Grade) {
        self.last_grade = Some(grade);
        self.is_learned = grade.is_success();
    }
}

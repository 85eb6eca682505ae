//! Review statistics over a collection of flashcards.
use super::due::is_due;
use super::{Flashcard, Stage};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_cards: usize,
    pub due_cards: usize,
    /// Never passed since creation or the last lapse.
    pub new_cards: usize,
    /// One or two consecutive passes.
    pub learning_cards: usize,
    /// Three or more consecutive passes.
    pub mastered_cards: usize,
    pub reviewed_today: usize,
    pub average_ease_factor: f64,
}

impl ReviewStats {
    pub fn collect<'a>(cards: impl IntoIterator<Item = &'a Flashcard>, today: NaiveDate) -> Self {
        let mut stats = ReviewStats::default();
        let mut ease_sum = 0.0;

        for card in cards {
            stats.total_cards += 1;
            ease_sum += card.state.ease_factor;

            if is_due(card.state.next_review_date, today) {
                stats.due_cards += 1;
            }
            if card.state.last_review_date == Some(today) {
                stats.reviewed_today += 1;
            }
            match card.state.stage() {
                Stage::New => stats.new_cards += 1,
                Stage::Learning1 | Stage::Learning2 => stats.learning_cards += 1,
                Stage::Reviewing => stats.mastered_cards += 1,
            }
        }

        if stats.total_cards > 0 {
            stats.average_ease_factor = ease_sum / stats.total_cards as f64;
        }
        stats
    }

    /// Share of cards in the reviewing stage, 0-100.
    pub fn mastery_percentage(&self) -> u32 {
        if self.total_cards == 0 {
            return 0;
        }
        ((self.mastered_cards as f64 / self.total_cards as f64) * 100.0).round() as u32
    }
}

//! Learning session management for spaced repetition practice.
//! Handles multi-round flashcard review with SM-2 algorithm integration.

use super::sm2::ReviewPolicy;
use super::{Flashcard, Grade, LearningCard};
use crate::error::Result;
use chrono::NaiveDate;

/// Manages a learning session with multiple review rounds.
/// Cards that aren't passed (grade < 3) are repeated in subsequent rounds.
///
/// The session works on a snapshot; persisting the rescheduled cards is the
/// caller's job.
pub struct LearningSession {
    pub deck_name: String,
    pub all_cards: Vec<LearningCard>,
    pub current_round_cards: Vec<usize>,
    pub current_index: usize,
    pub show_answer: bool,
    pub round_number: usize,
    pub today: NaiveDate,
    pub policy: ReviewPolicy,
}

impl LearningSession {
    /// Creates a new learning session from cards that are due for review.
    pub fn new_from_due_cards(
        deck_name: String,
        cards: Vec<Flashcard>,
        today: NaiveDate,
        policy: ReviewPolicy,
    ) -> Self {
        let all_cards: Vec<_> = cards.into_iter().map(LearningCard::new).collect();
        let indices: Vec<usize> = (0..all_cards.len()).collect();

        log::info!(
            "Starting session for deck '{}' with {} cards",
            deck_name,
            all_cards.len()
        );

        Self {
            deck_name,
            all_cards,
            current_round_cards: indices,
            current_index: 0,
            show_answer: false,
            round_number: 1,
            today,
            policy,
        }
    }

    pub fn current_card(&self) -> Option<&LearningCard> {
        self.current_round_cards
            .get(self.current_index)
            .and_then(|&idx| self.all_cards.get(idx))
    }

    pub fn toggle_answer(&mut self) {
        self.show_answer = !self.show_answer;
    }

    pub fn next_card(&mut self) {
        if self.current_index + 1 < self.current_round_cards.len() {
            self.current_index += 1;
            self.show_answer = false;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with the cards that were not passed.
    /// If none remain, the session is complete.
    fn start_next_round(&mut self) {
        let failed_indices: Vec<usize> = self
            .current_round_cards
            .iter()
            .copied()
            .filter(|&idx| {
                self.all_cards
                    .get(idx)
                    .map(|card| !card.is_learned)
                    .unwrap_or(false)
            })
            .collect();

        if failed_indices.is_empty() {
            return;
        }

        self.current_round_cards = failed_indices;
        self.current_index = 0;
        self.show_answer = false;
        self.round_number += 1;
        log::debug!(
            "Round {} of '{}': {} cards to retry",
            self.round_number,
            self.deck_name,
            self.current_round_cards.len()
        );
    }

    /// Grades the current card and reschedules it with SM-2.
    ///
    /// Returns the updated flashcard for persisting, or `None` when there is
    /// no current card.
    pub fn grade_current_card(&mut self, grade: Grade) -> Result<Option<Flashcard>> {
        let Some(&idx) = self.current_round_cards.get(self.current_index) else {
            return Ok(None);
        };
        let Some(card) = self.all_cards.get_mut(idx) else {
            return Ok(None);
        };

        card.flashcard.review(grade, self.today, self.policy)?;
        card.record_grade(grade);

        Ok(Some(card.flashcard.clone()))
    }

    pub fn learned_count(&self) -> usize {
        self.current_round_cards
            .iter()
            .filter(|&&idx| {
                self.all_cards
                    .get(idx)
                    .map(|card| card.is_learned)
                    .unwrap_or(false)
            })
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round_cards.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.learned_count()
    }

    /// Returns true when all cards in the current round have been passed.
    pub fn is_completed(&self) -> bool {
        self.learned_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} cards", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Review): {} cards to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}

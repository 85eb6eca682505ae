//! Flashcard is a pair <front, back> plus the SM-2 state that schedules it.
use super::due::Scheduled;
use super::sm2::{self, ReviewPolicy};
use super::{Grade, SchedulingState};
use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    #[serde(default)]
    pub id: i64,
    pub front: String,
    pub back: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(with = "super::due::iso_date")]
    pub created_at: NaiveDate,
    #[serde(flatten)]
    pub state: SchedulingState,
}

impl Flashcard {
    pub fn new(id: i64, front: &str, back: &str, created_at: NaiveDate) -> Self {
        Self {
            id,
            front: front.to_string(),
            back: back.to_string(),
            category: None,
            created_at,
            state: SchedulingState::new(created_at),
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Grades the card; the state is replaced only if the whole update succeeds.
    pub fn review(&mut self, grade: Grade, today: NaiveDate, policy: ReviewPolicy) -> Result<()> {
        self.state = sm2::compute_review(grade, &self.state, today, policy)?;
        Ok(())
    }
}

impl Scheduled for Flashcard {
    fn next_review_date(&self) -> NaiveDate {
        self.state.next_review_date
    }
}

impl Scheduled for SchedulingState {
    fn next_review_date(&self) -> NaiveDate {
        self.next_review_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_flashcard_creation() {
        let card = Flashcard::new(1, "hello", "cześć", day(2024, 1, 1)).with_category("Polish");

        assert_eq!(card.front, "hello");
        assert_eq!(card.back, "cześć");
        assert_eq!(card.category.as_deref(), Some("Polish"));
        assert_eq!(card.next_review_date(), day(2024, 1, 1));
    }

    #[test]
    fn test_review_keeps_identity() {
        let mut card = Flashcard::new(7, "2 + 2", "4", day(2024, 1, 1));
        card.review(Grade::new(5), day(2024, 1, 2), ReviewPolicy::default())
            .unwrap();

        assert_eq!(card.id, 7);
        assert_eq!(card.front, "2 + 2");
        assert_eq!(card.created_at, day(2024, 1, 1));
        assert_eq!(card.state.repetitions, 1);
        assert_eq!(card.state.next_review_date, day(2024, 1, 3));
    }

    #[test]
    fn test_failed_review_leaves_state_untouched() {
        let mut card = Flashcard::new(1, "q", "a", day(2024, 1, 1));
        card.state.ease_factor = f64::NAN;
        let before = card.state.repetitions;

        assert!(card.review(Grade::new(5), day(2024, 1, 2), ReviewPolicy::default()).is_err());
        assert_eq!(card.state.repetitions, before);
        assert!(card.state.last_review_date.is_none());
    }

    #[test]
    fn test_json_shape_is_flat() {
        let card = Flashcard::new(3, "capital of France", "Paris", day(2024, 2, 1));
        let value: serde_json::Value = serde_json::to_value(&card).unwrap();

        assert_eq!(value["front"], "capital of France");
        assert_eq!(value["easeFactor"], 2.5);
        assert_eq!(value["repetitions"], 0);
        assert_eq!(value["nextReviewDate"], "2024-02-01");
        assert!(value.get("category").is_none());
    }
}

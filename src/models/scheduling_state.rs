//! Per-card SM-2 scheduling state.
use crate::error::{Result, SchedulerError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ease factor a new card starts with.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;
/// Ease factor never drops below this.
pub const MIN_EASE_FACTOR: f64 = 1.3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingState {
    pub ease_factor: f64,
    pub repetitions: u32,
    /// Days until the next review.
    pub interval: u32,
    #[serde(with = "super::due::iso_date")]
    pub next_review_date: NaiveDate,
    #[serde(default, with = "super::due::iso_date::option")]
    pub last_review_date: Option<NaiveDate>,
}

impl SchedulingState {
    /// State of a freshly created card: due on the day it was created.
    pub fn new(created_on: NaiveDate) -> Self {
        Self::with_ease_factor(created_on, INITIAL_EASE_FACTOR)
    }

    pub fn with_ease_factor(created_on: NaiveDate, ease_factor: f64) -> Self {
        Self {
            ease_factor,
            repetitions: 0,
            interval: 0,
            next_review_date: created_on,
            last_review_date: None,
        }
    }

    pub fn stage(&self) -> Stage {
        Stage::from_repetitions(self.repetitions)
    }

    /// Rejects states no review could have produced.
    pub fn validate(&self) -> Result<()> {
        validate_ease_factor(self.ease_factor)
    }
}

pub fn validate_ease_factor(ease_factor: f64) -> Result<()> {
    if !ease_factor.is_finite() {
        return Err(SchedulerError::InvalidState(format!(
            "ease factor must be finite, got {}",
            ease_factor
        )));
    }
    if ease_factor < MIN_EASE_FACTOR {
        return Err(SchedulerError::InvalidState(format!(
            "ease factor {} is below the minimum {}",
            ease_factor, MIN_EASE_FACTOR
        )));
    }
    Ok(())
}

/// Converts a persisted integer count into an unsigned one.
pub fn non_negative(field: &str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        SchedulerError::InvalidState(format!("{} must be a non-negative integer, got {}", field, value))
    })
}

/// Position on the learning ladder, derived from the repetition count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    New,
    Learning1,
    Learning2,
    Reviewing,
}

impl Stage {
    pub fn from_repetitions(repetitions: u32) -> Self {
        match repetitions {
            0 => Stage::New,
            1 => Stage::Learning1,
            2 => Stage::Learning2,
            _ => Stage::Reviewing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_state_is_due_on_creation() {
        let state = SchedulingState::new(day(2024, 3, 1));
        assert_eq!(state.ease_factor, 2.5);
        assert_eq!(state.repetitions, 0);
        assert_eq!(state.interval, 0);
        assert_eq!(state.next_review_date, day(2024, 3, 1));
        assert!(state.last_review_date.is_none());
        assert_eq!(state.stage(), Stage::New);
    }

    #[test]
    fn test_validate_rejects_bad_ease_factor() {
        let mut state = SchedulingState::new(day(2024, 3, 1));
        assert!(state.validate().is_ok());

        state.ease_factor = f64::NAN;
        assert!(matches!(state.validate(), Err(SchedulerError::InvalidState(_))));

        state.ease_factor = f64::INFINITY;
        assert!(state.validate().is_err());

        state.ease_factor = -2.5;
        assert!(state.validate().is_err());

        state.ease_factor = 1.29;
        assert!(state.validate().is_err());

        state.ease_factor = MIN_EASE_FACTOR;
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative("interval", 6).unwrap(), 6);
        assert!(non_negative("interval", -1).is_err());
    }

    #[test]
    fn test_stage_ladder() {
        assert_eq!(Stage::from_repetitions(0), Stage::New);
        assert_eq!(Stage::from_repetitions(1), Stage::Learning1);
        assert_eq!(Stage::from_repetitions(2), Stage::Learning2);
        assert_eq!(Stage::from_repetitions(3), Stage::Reviewing);
        assert_eq!(Stage::from_repetitions(40), Stage::Reviewing);
    }

    #[test]
    fn test_state_json_uses_iso_dates() {
        let state = SchedulingState::new(day(2024, 1, 5));
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"nextReviewDate\":\"2024-01-05\""));
        assert!(json.contains("\"lastReviewDate\":null"));
    }
}

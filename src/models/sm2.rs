//! SM-2 (SuperMemo 2) spaced repetition algorithm implementation.
//!
//! The SM-2 algorithm calculates review intervals based on recall quality:
//! - Each card has an ease factor (EF) that is recomputed after every review
//! - Quality grades 0-2: reset repetitions, review again tomorrow
//! - Quality grades 3-5: increase interval progressively (1 day → 6 days → EF multiplier)
//! - EF has a minimum value of 1.3
//!
//! Intervals are rounded half away from zero (`f64::round`), so `2.5` days
//! becomes 3.

use super::scheduling_state::{MIN_EASE_FACTOR, SchedulingState, validate_ease_factor};
use super::{Grade, due};
use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a grade-3 pass on an established card is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewPolicy {
    /// A grade-3 pass after more than one consecutive success resets the
    /// card like a lapse: the schedule overshot.
    #[default]
    ResetOnHesitantPass,
    /// Textbook SM-2: every pass grows the interval.
    Classic,
}

/// Output of a single SM-2 step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sm2Update {
    pub repetitions: u32,
    pub ease_factor: f64,
    pub interval: u32,
}

/// Recomputed ease factor, floored at 1.3.
pub fn next_ease_factor(ease_factor: f64, grade: Grade) -> f64 {
    let miss = (Grade::MAX - grade.value()) as f64;
    let ef = ease_factor + (0.1 - miss * (0.08 + miss * 0.02));
    ef.max(MIN_EASE_FACTOR)
}

/// One SM-2 review step.
///
/// `interval` is the interval the card was reviewed under; it only matters
/// from the third consecutive success onward.
pub fn update(
    grade: Grade,
    repetitions: u32,
    ease_factor: f64,
    interval: u32,
    policy: ReviewPolicy,
) -> Result<Sm2Update> {
    validate_ease_factor(ease_factor)?;

    let ease_factor = next_ease_factor(ease_factor, grade);

    let soft_lapse = policy == ReviewPolicy::ResetOnHesitantPass
        && grade.value() == Grade::PASS
        && repetitions > 1;

    let (repetitions, interval) = if grade.is_lapse() || soft_lapse {
        (0, 1)
    } else {
        let repetitions = repetitions.saturating_add(1);
        let interval = match repetitions {
            1 => 1,
            2 => 6,
            // Float to int casts saturate, so huge intervals cap at u32::MAX.
            _ => ((interval as f64 * ease_factor).round() as u32).max(1),
        };
        (repetitions, interval)
    };

    Ok(Sm2Update {
        repetitions,
        ease_factor,
        interval,
    })
}

/// Applies a review made on `today` to a card's state.
pub fn compute_review(
    grade: Grade,
    state: &SchedulingState,
    today: NaiveDate,
    policy: ReviewPolicy,
) -> Result<SchedulingState> {
    state.validate()?;
    let step = update(grade, state.repetitions, state.ease_factor, state.interval, policy)?;

    Ok(SchedulingState {
        ease_factor: step.ease_factor,
        repetitions: step.repetitions,
        interval: step.interval,
        next_review_date: due::next_review_date(today, step.interval)?,
        last_review_date: Some(today),
    })
}

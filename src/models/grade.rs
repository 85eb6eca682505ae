//! Recall quality grade on the SM-2 scale.
//!
//! - 0: complete blackout
//! - 1: incorrect, but the answer was recognized
//! - 2: incorrect, but the answer felt recoverable
//! - 3: correct with real effort
//! - 4: correct after hesitation
//! - 5: perfect, effortless recall
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Grade(u8);

impl Grade {
    pub const MAX: u8 = 5;
    /// Lowest grade that counts as a successful recall.
    pub const PASS: u8 = 3;

    /// Builds a grade, clamping anything outside `0..=5` to the nearest bound.
    pub fn new(raw: i64) -> Self {
        Grade(raw.clamp(0, Self::MAX as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 >= Self::PASS
    }

    pub fn is_lapse(self) -> bool {
        !self.is_success()
    }

    pub fn description(self) -> &'static str {
        match self.0 {
            0 => "complete blackout",
            1 => "incorrect, recognized the answer",
            2 => "incorrect, felt recoverable",
            3 => "correct with real effort",
            4 => "correct after hesitation",
            _ => "perfect recall",
        }
    }
}

impl From<i64> for Grade {
    fn from(raw: i64) -> Self {
        Grade::new(raw)
    }
}

impl From<u8> for Grade {
    fn from(raw: u8) -> Self {
        Grade::new(raw as i64)
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Calendar-date handling: the date boundary, next-review dates and the due rule.
//!
//! Every date entering the scheduler is normalized to a `NaiveDate`. Time of
//! day never influences whether a card is due, so a card scheduled for today
//! is due from midnight onward regardless of clock or timezone skew between
//! the caller and the stored date.

use crate::error::{Result, SchedulerError};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeZone};
use std::fmt;

/// Anything that can name the calendar day of a review.
pub trait ToReviewDate {
    fn to_review_date(&self) -> Result<NaiveDate>;
}

impl ToReviewDate for NaiveDate {
    fn to_review_date(&self) -> Result<NaiveDate> {
        Ok(*self)
    }
}

impl ToReviewDate for NaiveDateTime {
    fn to_review_date(&self) -> Result<NaiveDate> {
        Ok(self.date())
    }
}

impl<Tz: TimeZone> ToReviewDate for DateTime<Tz> {
    fn to_review_date(&self) -> Result<NaiveDate> {
        Ok(self.date_naive())
    }
}

impl ToReviewDate for str {
    fn to_review_date(&self) -> Result<NaiveDate> {
        parse_review_date(self)
    }
}

impl ToReviewDate for String {
    fn to_review_date(&self) -> Result<NaiveDate> {
        parse_review_date(self)
    }
}

impl<T: ToReviewDate + ?Sized> ToReviewDate for &T {
    fn to_review_date(&self) -> Result<NaiveDate> {
        (**self).to_review_date()
    }
}

/// Parses an ISO-8601 calendar date, optionally followed by a time.
///
/// Accepted: `2024-01-31`, `2024-01-31T08:30:00`, `2024-01-31T08:30:00.250`,
/// `2024-01-31T08:30:00Z`, `2024-01-31T08:30:00+02:00`. The date is taken as
/// written; an offset is validated but never used to shift the day.
pub fn parse_review_date(input: &str) -> Result<NaiveDate> {
    let invalid = || SchedulerError::InvalidDate(input.to_string());

    let date_part = input.get(..10).ok_or_else(invalid)?;
    if !has_date_shape(date_part) {
        return Err(invalid());
    }
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| invalid())?;

    let rest = &input[10..];
    if rest.is_empty() {
        return Ok(date);
    }
    if !rest.starts_with('T') {
        return Err(invalid());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.date_naive());
    }
    for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, layout) {
            return Ok(dt.date());
        }
    }
    Err(invalid())
}

fn has_date_shape(s: &str) -> bool {
    s.bytes().enumerate().all(|(i, b)| match i {
        4 | 7 => b == b'-',
        _ => b.is_ascii_digit(),
    })
}

/// Serde adapter keeping JSON dates on the same parser as every other input.
pub mod iso_date {
    use super::parse_review_date;
    use chrono::NaiveDate;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(date)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_review_date(&raw).map_err(D::Error::custom)
    }

    pub mod option {
        use super::parse_review_date;
        use chrono::NaiveDate;
        use serde::de::Error;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => serializer.collect_str(date),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| parse_review_date(&raw).map_err(D::Error::custom))
                .transpose()
        }
    }
}

/// Adds `interval_days` calendar days to `reference`.
pub fn next_review_date(reference: NaiveDate, interval_days: u32) -> Result<NaiveDate> {
    reference
        .checked_add_days(Days::new(interval_days as u64))
        .ok_or_else(|| {
            SchedulerError::InvalidDate(format!(
                "{} plus {} days is out of range",
                reference, interval_days
            ))
        })
}

/// True when `next_review_date` falls on or before `now`.
pub fn is_due(next_review_date: NaiveDate, now: NaiveDate) -> bool {
    next_review_date <= now
}

/// `is_due` for inputs that still need normalizing.
pub fn is_due_at<A: ToReviewDate, B: ToReviewDate>(next_review_date: A, now: B) -> Result<bool> {
    Ok(is_due(next_review_date.to_review_date()?, now.to_review_date()?))
}

/// Something carrying a next-review date.
pub trait Scheduled {
    fn next_review_date(&self) -> NaiveDate;
}

impl<T: Scheduled + ?Sized> Scheduled for &T {
    fn next_review_date(&self) -> NaiveDate {
        (**self).next_review_date()
    }
}

/// Cards due on `now`, in input order.
pub fn filter_due<T: Scheduled>(cards: impl IntoIterator<Item = T>, now: NaiveDate) -> Vec<T> {
    let due: Vec<T> = cards
        .into_iter()
        .filter(|card| is_due(card.next_review_date(), now))
        .collect();
    log::debug!("{} cards due on {}", due.len(), now);
    due
}

/// Due cards ordered oldest first, ties kept in input order.
pub fn due_queue<T: Scheduled>(cards: impl IntoIterator<Item = T>, now: NaiveDate) -> Vec<T> {
    let mut due = filter_due(cards, now);
    due.sort_by_key(|card| card.next_review_date());
    due
}

/// Whole days from `today` until the review; zero or negative when due.
pub fn days_until_review(next_review_date: NaiveDate, today: NaiveDate) -> i64 {
    (next_review_date - today).num_days()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewStatus {
    DueNow,
    DueTomorrow,
    DueIn(i64),
}

impl ReviewStatus {
    pub fn of(next_review_date: NaiveDate, today: NaiveDate) -> Self {
        match days_until_review(next_review_date, today) {
            d if d <= 0 => ReviewStatus::DueNow,
            1 => ReviewStatus::DueTomorrow,
            d => ReviewStatus::DueIn(d),
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewStatus::DueNow => write!(f, "Due now"),
            ReviewStatus::DueTomorrow => write!(f, "Due tomorrow"),
            ReviewStatus::DueIn(days) => write!(f, "Due in {} days", days),
        }
    }
}

pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use config::Config;
pub use database::db::CardStore;
pub use error::{Result, SchedulerError};
pub use models::due::{filter_due, is_due, is_due_at, next_review_date, parse_review_date};
pub use models::sm2::{compute_review, update};
pub use models::{Deck, Flashcard, Grade, LearningSession, ReviewPolicy, SchedulingState};

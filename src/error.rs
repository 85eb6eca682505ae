//! Error type shared by the scheduler core, storage and import/export.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid scheduling state: {0}")]
    InvalidState(String),

    #[error("Flashcard not found: {0}")]
    CardNotFound(i64),

    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    #[error("Deck already exists: {0}")]
    DeckExists(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for SchedulerError {
    fn from(e: toml::de::Error) -> Self {
        SchedulerError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

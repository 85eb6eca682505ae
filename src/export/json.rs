//! JSON import/export module for flashcard decks.
//! Saves and loads Deck structures, scheduling state included, to/from JSON files.

use crate::error::Result;
use crate::models::Deck;
use std::fs;
use std::path::Path;

/// Exports a deck to a JSON file at the specified path.
pub fn export_json_to_path(deck: &Deck, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json_string = serde_json::to_string_pretty(deck)?;
    fs::write(path, json_string)?;
    log::info!("Deck '{}' exported to {:?}", deck.name, path);
    Ok(())
}

/// Imports a deck from a JSON file.
///
/// Fails if the file is missing, is not valid JSON, or carries a card whose
/// scheduling state could not have come from a review.
pub fn import_json(path: impl AsRef<Path>) -> Result<Deck> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let deck: Deck = serde_json::from_str(&contents)?;

    for card in &deck.flashcards {
        card.state.validate()?;
    }

    log::info!("Deck '{}' imported from {:?}", deck.name, path);
    Ok(deck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchedulerError;
    use crate::models::{Flashcard, Grade, ReviewPolicy};
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_deck() -> Deck {
        let mut reviewed = Flashcard::new(2, "goodbye", "do widzenia", day(2024, 1, 1));
        reviewed
            .review(Grade::new(4), day(2024, 1, 3), ReviewPolicy::default())
            .unwrap();

        Deck {
            name: "Test Deck".to_string(),
            flashcards: vec![
                Flashcard::new(1, "hello", "cześć", day(2024, 1, 1)).with_category("greetings"),
                reviewed,
            ],
        }
    }

    #[test]
    fn test_export_json_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_export.json");

        export_json_to_path(&create_test_deck(), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"nextReviewDate\": \"2024-01-04\""));
    }

    #[test]
    fn test_import_json() {
        let json_content = r#"{
  "name": "Import Test Deck",
  "flashcards": [
    {
      "front": "What is 2 + 2?",
      "back": "4",
      "category": "Mathematics",
      "createdAt": "2024-03-01",
      "easeFactor": 2.36,
      "repetitions": 2,
      "interval": 6,
      "nextReviewDate": "2024-03-09",
      "lastReviewDate": "2024-03-03"
    }
  ]
}"#;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_import.json");
        fs::write(&path, json_content).unwrap();

        let deck = import_json(&path).unwrap();
        assert_eq!(deck.name, "Import Test Deck");
        assert_eq!(deck.flashcards.len(), 1);

        let card = &deck.flashcards[0];
        assert_eq!(card.id, 0);
        assert_eq!(card.front, "What is 2 + 2?");
        assert_eq!(card.category.as_deref(), Some("Mathematics"));
        assert_eq!(card.state.repetitions, 2);
        assert_eq!(card.state.interval, 6);
        assert_eq!(card.state.next_review_date, day(2024, 3, 9));
        assert_eq!(card.state.last_review_date, Some(day(2024, 3, 3)));
    }

    #[test]
    fn test_export_and_import_keep_schedule() {
        let original_deck = create_test_deck();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_roundtrip.json");

        export_json_to_path(&original_deck, &path).unwrap();
        let imported_deck = import_json(&path).unwrap();

        assert_eq!(original_deck.name, imported_deck.name);
        assert_eq!(original_deck.flashcards, imported_deck.flashcards);
    }

    #[test]
    fn test_import_nonexistent_file() {
        let result = import_json("nonexistent_file_xyz123.json");
        assert!(matches!(result, Err(SchedulerError::Io(_))));
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_invalid.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        assert!(matches!(import_json(&path), Err(SchedulerError::Json(_))));
    }

    #[test]
    fn test_import_rejects_malformed_dates_and_state() {
        let dir = tempfile::tempdir().unwrap();

        let bad_date = dir.path().join("bad_date.json");
        fs::write(
            &bad_date,
            r#"{"name": "d", "flashcards": [{"front": "a", "back": "b", "createdAt": "2024-01-01",
                "easeFactor": 2.5, "repetitions": 0, "interval": 0, "nextReviewDate": "Today"}]}"#,
        )
        .unwrap();
        assert!(import_json(&bad_date).is_err());

        let negative = dir.path().join("negative.json");
        fs::write(
            &negative,
            r#"{"name": "d", "flashcards": [{"front": "a", "back": "b", "createdAt": "2024-01-01",
                "easeFactor": 2.5, "repetitions": -1, "interval": 0, "nextReviewDate": "2024-01-01"}]}"#,
        )
        .unwrap();
        assert!(import_json(&negative).is_err());

        let low_ef = dir.path().join("low_ef.json");
        fs::write(
            &low_ef,
            r#"{"name": "d", "flashcards": [{"front": "a", "back": "b", "createdAt": "2024-01-01",
                "easeFactor": 0.4, "repetitions": 0, "interval": 0, "nextReviewDate": "2024-01-01"}]}"#,
        )
        .unwrap();
        assert!(matches!(import_json(&low_ef), Err(SchedulerError::InvalidState(_))));
    }
}

//! Database operations for the flashcard scheduler
//!
//! Handles SQLite database initialization, CRUD operations for decks and flashcards,
//! and persistence of SM-2 scheduling state. Dates are stored as ISO-8601
//! `YYYY-MM-DD` text, which also sorts chronologically.

use crate::error::{Result, SchedulerError};
use crate::models::due::{self, parse_review_date};
use crate::models::scheduling_state::non_negative;
use crate::models::sm2::{self, ReviewPolicy};
use crate::models::{Deck, Flashcard, Grade, SchedulingState};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;

const CARD_COLUMNS: &str = "id, front, back, category, created_at, ease_factor, repetitions, \
     interval_days, next_review_date, last_review_date";

/// Handle to the flashcard database. Every storage operation goes through
/// one of these; there is no global connection.
pub struct CardStore {
    conn: Connection,
}

impl CardStore {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Opening flashcard database at {:?}", path);
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Creates tables for decks, flashcards and app state.
    /// Sets the current date to today if not already initialized.
    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS decks (
                name TEXT PRIMARY KEY
            )",
            (),
        )?;

        // Scheduling state lives on the card row so a review is one UPDATE
        conn.execute(
            "CREATE TABLE IF NOT EXISTS flashcards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                deck_name TEXT NOT NULL,
                front TEXT NOT NULL,
                back TEXT NOT NULL,
                category TEXT,
                created_at TEXT NOT NULL,
                ease_factor REAL NOT NULL DEFAULT 2.5,
                repetitions INTEGER NOT NULL DEFAULT 0,
                interval_days INTEGER NOT NULL DEFAULT 0,
                next_review_date TEXT NOT NULL,
                last_review_date TEXT,
                FOREIGN KEY (deck_name) REFERENCES decks(name) ON DELETE CASCADE,
                UNIQUE(deck_name, front)
            )",
            (),
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_flashcards_due
             ON flashcards (deck_name, next_review_date)",
            (),
        )?;

        // Simulated "today", advanced manually to exercise the schedule
        conn.execute(
            "CREATE TABLE IF NOT EXISTS app_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            (),
        )?;

        conn.execute(
            "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
            params![Local::now().date_naive().to_string()],
        )?;

        Ok(Self { conn })
    }

    /// Retrieves the current simulated date.
    pub fn current_date(&self) -> Result<NaiveDate> {
        let value: String = self.conn.query_row(
            "SELECT value FROM app_state WHERE key = 'current_date'",
            [],
            |row| row.get(0),
        )?;
        parse_review_date(&value)
    }

    pub fn set_current_date(&self, date: NaiveDate) -> Result<()> {
        self.conn.execute(
            "UPDATE app_state SET value = ?1 WHERE key = 'current_date'",
            params![date.to_string()],
        )?;
        Ok(())
    }

    /// Moves the simulated date forward by `days` calendar days.
    pub fn advance_days(&self, days: u32) -> Result<NaiveDate> {
        let next = due::next_review_date(self.current_date()?, days)?;
        self.set_current_date(next)?;
        log::info!("Current date advanced to {}", next);
        Ok(next)
    }

    pub fn new_deck(&self, name: &str) -> Result<()> {
        let inserted = self
            .conn
            .execute("INSERT OR IGNORE INTO decks (name) VALUES (?1)", params![name])?;
        if inserted == 0 {
            return Err(SchedulerError::DeckExists(name.to_string()));
        }
        log::info!("Deck '{}' created", name);
        Ok(())
    }

    pub fn deck_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM decks ORDER BY name")?;
        let decks = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(decks)
    }

    fn ensure_deck(&self, name: &str) -> Result<()> {
        let found: Option<String> = self
            .conn
            .query_row("SELECT name FROM decks WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()?;
        found
            .map(|_| ())
            .ok_or_else(|| SchedulerError::DeckNotFound(name.to_string()))
    }

    /// Adds a new card to a deck, due today.
    ///
    /// If a card with the same front already exists in the deck, the existing
    /// card is returned unchanged.
    pub fn add_flashcard(
        &self,
        deck_name: &str,
        front: &str,
        back: &str,
        category: Option<&str>,
        initial_ease_factor: f64,
    ) -> Result<Flashcard> {
        self.ensure_deck(deck_name)?;
        let today = self.current_date()?;

        let mut card = Flashcard::new(0, front, back, today);
        card.category = category.map(str::to_string);
        card.state = SchedulingState::with_ease_factor(today, initial_ease_factor);
        card.state.validate()?;

        let id = insert_card(&self.conn, deck_name, &card)?;
        self.get_flashcard(id)
    }

    pub fn get_flashcard(&self, id: i64) -> Result<Flashcard> {
        fetch_card(&self.conn, id)
    }

    /// All cards of a deck, oldest first.
    pub fn flashcards_for_deck(&self, deck_name: &str) -> Result<Vec<Flashcard>> {
        self.ensure_deck(deck_name)?;
        self.query_cards(
            &format!("SELECT {} FROM flashcards WHERE deck_name = ?1 ORDER BY id", CARD_COLUMNS),
            deck_name,
        )
    }

    /// Cards of a deck due on the current simulated date, oldest due date first.
    pub fn due_flashcards(&self, deck_name: &str) -> Result<Vec<Flashcard>> {
        self.ensure_deck(deck_name)?;
        let today = self.current_date()?;
        let cards = self.query_cards(
            &format!(
                "SELECT {} FROM flashcards WHERE deck_name = ?1
                 ORDER BY next_review_date ASC, id ASC",
                CARD_COLUMNS
            ),
            deck_name,
        )?;
        Ok(due::due_queue(cards, today))
    }

    fn query_cards(&self, sql: &str, deck_name: &str) -> Result<Vec<Flashcard>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![deck_name], StoredCard::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(StoredCard::into_flashcard).collect()
    }

    /// Edits the content of a card; its schedule is untouched.
    pub fn update_flashcard(&self, id: i64, front: &str, back: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE flashcards SET front = ?1, back = ?2 WHERE id = ?3",
            params![front, back, id],
        )?;
        if changed == 0 {
            return Err(SchedulerError::CardNotFound(id));
        }
        Ok(())
    }

    pub fn delete_flashcard(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM flashcards WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(SchedulerError::CardNotFound(id));
        }
        Ok(())
    }

    /// Stores a scheduling state computed elsewhere, e.g. by a learning session.
    pub fn save_state(&self, id: i64, state: &SchedulingState) -> Result<()> {
        state.validate()?;
        write_state(&self.conn, id, state)
    }

    /// Reviews one card on the current simulated date.
    ///
    /// The read, the SM-2 step and the write share one transaction, so two
    /// reviews of the same card are applied one after the other.
    pub fn apply_review(&mut self, id: i64, grade: Grade, policy: ReviewPolicy) -> Result<Flashcard> {
        let today = self.current_date()?;
        let tx = self.conn.transaction()?;

        let mut card = fetch_card(&tx, id)?;
        card.state = sm2::compute_review(grade, &card.state, today, policy)?;
        write_state(&tx, id, &card.state)?;
        tx.commit()?;

        log::debug!(
            "Card {} graded {}: repetitions={} interval={} ease_factor={:.2} next={}",
            id,
            grade,
            card.state.repetitions,
            card.state.interval,
            card.state.ease_factor,
            card.state.next_review_date
        );
        Ok(card)
    }

    /// Loads a deck with all its cards.
    pub fn load_deck(&self, name: &str) -> Result<Deck> {
        Ok(Deck {
            name: name.to_string(),
            flashcards: self.flashcards_for_deck(name)?,
        })
    }

    /// Stores an imported deck, keeping each card's scheduling state.
    /// Creates the deck if needed; cards whose front already exists are skipped.
    /// Returns the number of cards added.
    pub fn import_deck(&mut self, deck: &Deck) -> Result<usize> {
        for card in &deck.flashcards {
            card.state.validate()?;
        }

        let tx = self.conn.transaction()?;
        tx.execute("INSERT OR IGNORE INTO decks (name) VALUES (?1)", params![deck.name])?;

        let mut added = 0;
        for card in &deck.flashcards {
            added += insert_row(&tx, &deck.name, card)?;
        }
        tx.commit()?;

        log::info!(
            "Imported {} of {} cards into deck '{}'",
            added,
            deck.flashcards.len(),
            deck.name
        );
        Ok(added)
    }
}

fn insert_row(conn: &Connection, deck_name: &str, card: &Flashcard) -> Result<usize> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO flashcards (deck_name, front, back, category, created_at,
             ease_factor, repetitions, interval_days, next_review_date, last_review_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            deck_name,
            card.front,
            card.back,
            card.category,
            card.created_at.to_string(),
            card.state.ease_factor,
            card.state.repetitions,
            card.state.interval,
            card.state.next_review_date.to_string(),
            card.state.last_review_date.map(|d| d.to_string()),
        ],
    )?;
    Ok(inserted)
}

fn insert_card(conn: &Connection, deck_name: &str, card: &Flashcard) -> Result<i64> {
    insert_row(conn, deck_name, card)?;

    let id = conn.query_row(
        "SELECT id FROM flashcards WHERE deck_name = ?1 AND front = ?2",
        params![deck_name, card.front],
        |row| row.get(0),
    )?;
    Ok(id)
}

fn fetch_card(conn: &Connection, id: i64) -> Result<Flashcard> {
    conn.query_row(
        &format!("SELECT {} FROM flashcards WHERE id = ?1", CARD_COLUMNS),
        params![id],
        StoredCard::from_row,
    )
    .optional()?
    .ok_or(SchedulerError::CardNotFound(id))?
    .into_flashcard()
}

fn write_state(conn: &Connection, id: i64, state: &SchedulingState) -> Result<()> {
    let changed = conn.execute(
        "UPDATE flashcards
         SET ease_factor = ?1, repetitions = ?2, interval_days = ?3,
             next_review_date = ?4, last_review_date = ?5
         WHERE id = ?6",
        params![
            state.ease_factor,
            state.repetitions,
            state.interval,
            state.next_review_date.to_string(),
            state.last_review_date.map(|d| d.to_string()),
            id
        ],
    )?;
    if changed == 0 {
        return Err(SchedulerError::CardNotFound(id));
    }
    Ok(())
}

/// A card row as stored, before validation.
struct StoredCard {
    id: i64,
    front: String,
    back: String,
    category: Option<String>,
    created_at: String,
    ease_factor: f64,
    repetitions: i64,
    interval_days: i64,
    next_review_date: String,
    last_review_date: Option<String>,
}

impl StoredCard {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            front: row.get(1)?,
            back: row.get(2)?,
            category: row.get(3)?,
            created_at: row.get(4)?,
            ease_factor: row.get(5)?,
            repetitions: row.get(6)?,
            interval_days: row.get(7)?,
            next_review_date: row.get(8)?,
            last_review_date: row.get(9)?,
        })
    }

    fn into_flashcard(self) -> Result<Flashcard> {
        let state = SchedulingState {
            ease_factor: self.ease_factor,
            repetitions: non_negative("repetitions", self.repetitions)?,
            interval: non_negative("interval", self.interval_days)?,
            next_review_date: parse_review_date(&self.next_review_date)?,
            last_review_date: self
                .last_review_date
                .as_deref()
                .map(parse_review_date)
                .transpose()?,
        };
        state.validate()?;

        Ok(Flashcard {
            id: self.id,
            front: self.front,
            back: self.back,
            category: self.category,
            created_at: parse_review_date(&self.created_at)?,
            state,
        })
    }
}

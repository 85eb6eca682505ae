use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sm2_scheduler::export::json::{export_json_to_path, import_json};
use sm2_scheduler::models::{Flashcard, ReviewStats, ReviewStatus, SchedulingState};
use sm2_scheduler::{CardStore, Config, Grade, LearningSession, compute_review};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sm2", about = "SM-2 spaced repetition flashcards", version)]
struct Cli {
    /// Config file
    #[arg(long, global = true, default_value = "sm2.toml")]
    config: PathBuf,

    /// Database file, overriding the config
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deck management
    #[command(subcommand)]
    Deck(DeckCommand),

    /// Add a flashcard to a deck
    Add {
        deck: String,
        front: String,
        back: String,
        #[arg(long)]
        category: Option<String>,
    },

    /// List every card in a deck with its schedule
    List { deck: String },

    /// List cards due today, oldest first
    Due { deck: String },

    /// Grade one card (0-5)
    Review { id: i64, grade: i64 },

    /// Study a deck's due cards interactively
    Study { deck: String },

    /// Show review statistics for a deck
    Stats { deck: String },

    /// Print the simulated current date
    Today,

    /// Move the simulated current date forward
    AdvanceDay {
        #[arg(long, default_value = "1")]
        days: u32,
    },

    /// Write a deck to a JSON file
    Export { deck: String, path: PathBuf },

    /// Load a deck from a JSON file
    Import { path: PathBuf },

    /// Create a sample deck
    Seed,

    /// Replay a grade sequence on a new card
    Simulate {
        #[arg(required = true, allow_negative_numbers = true)]
        grades: Vec<i64>,
    },
}

#[derive(Subcommand)]
enum DeckCommand {
    /// Create a deck
    New { name: String },
    /// List decks
    List,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config {:?}", cli.config))?;

    if let Command::Simulate { grades } = &cli.command {
        return simulate(grades, &config);
    }

    let db_path = cli.db.clone().unwrap_or_else(|| config.database_path.clone());
    let mut store = CardStore::open(&db_path)
        .with_context(|| format!("Failed to open database {:?}", db_path))?;

    match cli.command {
        Command::Deck(DeckCommand::New { name }) => {
            store.new_deck(&name)?;
            println!("Deck '{}' created.", name);
        }
        Command::Deck(DeckCommand::List) => {
            for name in store.deck_names()? {
                let count = store.flashcards_for_deck(&name)?.len();
                println!("{} ({} cards)", name, count);
            }
        }
        Command::Add {
            deck,
            front,
            back,
            category,
        } => {
            let card = store.add_flashcard(
                &deck,
                &front,
                &back,
                category.as_deref(),
                config.initial_ease_factor,
            )?;
            println!("Added card {} to '{}'", card.id, deck);
        }
        Command::List { deck } => {
            let today = store.current_date()?;
            for card in store.flashcards_for_deck(&deck)? {
                print_card(&card, today);
            }
        }
        Command::Due { deck } => {
            let today = store.current_date()?;
            let due = store.due_flashcards(&deck)?;
            println!("{} cards due on {}", due.len(), today);
            for card in &due {
                print_card(card, today);
            }
        }
        Command::Review { id, grade } => {
            let card = store.apply_review(id, Grade::new(grade), config.policy)?;
            println!(
                "Card {}: next review {} (interval {} days, ease {:.2}, repetitions {})",
                card.id,
                card.state.next_review_date,
                card.state.interval,
                card.state.ease_factor,
                card.state.repetitions
            );
        }
        Command::Study { deck } => study(&store, &deck, &config)?,
        Command::Stats { deck } => {
            let today = store.current_date()?;
            let cards = store.flashcards_for_deck(&deck)?;
            let stats = ReviewStats::collect(&cards, today);
            println!("Total:          {}", stats.total_cards);
            println!("Due today:      {}", stats.due_cards);
            println!("New:            {}", stats.new_cards);
            println!("Learning:       {}", stats.learning_cards);
            println!("Mastered:       {} ({}%)", stats.mastered_cards, stats.mastery_percentage());
            println!("Reviewed today: {}", stats.reviewed_today);
            println!("Average ease:   {:.2}", stats.average_ease_factor);
        }
        Command::Today => println!("{}", store.current_date()?),
        Command::AdvanceDay { days } => {
            let today = store.advance_days(days)?;
            println!("Current date: {}", today);
        }
        Command::Export { deck, path } => {
            let deck = store.load_deck(&deck)?;
            export_json_to_path(&deck, &path)?;
            println!("Exported {} cards to {:?}", deck.flashcards.len(), path);
        }
        Command::Import { path } => {
            let deck = import_json(&path)?;
            let added = store.import_deck(&deck)?;
            println!("Imported {} cards into '{}'", added, deck.name);
        }
        Command::Seed => seed(&store, &config)?,
        Command::Simulate { grades } => simulate(&grades, &config)?,
    }

    Ok(())
}

fn print_card(card: &Flashcard, today: chrono::NaiveDate) {
    println!(
        "[{}] {} -> {} | {} | interval {}d, ease {:.2}, reps {}",
        card.id,
        card.front,
        card.back,
        ReviewStatus::of(card.state.next_review_date, today),
        card.state.interval,
        card.state.ease_factor,
        card.state.repetitions
    );
}

fn seed(store: &CardStore, config: &Config) -> Result<()> {
    let deck = "Polish Vocabulary";
    if !store.deck_names()?.iter().any(|name| name == deck) {
        store.new_deck(deck)?;
    }
    for (front, back) in [("cześć", "hello"), ("dziękuję", "thank you"), ("proszę", "please")] {
        store.add_flashcard(deck, front, back, Some("Polish"), config.initial_ease_factor)?;
    }
    println!("Sample data created!");
    Ok(())
}

fn simulate(grades: &[i64], config: &Config) -> Result<()> {
    let mut today = chrono::Local::now().date_naive();
    let mut state = SchedulingState::with_ease_factor(today, config.initial_ease_factor);
    println!("Initial: interval 0, repetitions 0, ease {:.2}", state.ease_factor);

    for (i, &raw) in grades.iter().enumerate() {
        let grade = Grade::new(raw);
        state = compute_review(grade, &state, today, config.policy)?;
        println!(
            "Review {} grade {} ({}): interval {}d, repetitions {}, ease {:.2}, next {}",
            i + 1,
            grade,
            grade.description(),
            state.interval,
            state.repetitions,
            state.ease_factor,
            state.next_review_date
        );
        today = state.next_review_date;
    }
    Ok(())
}

fn study(store: &CardStore, deck: &str, config: &Config) -> Result<()> {
    let today = store.current_date()?;
    let due = store.due_flashcards(deck)?;
    if due.is_empty() {
        println!("No cards due in '{}' on {}", deck, today);
        return Ok(());
    }

    let mut session = LearningSession::new_from_due_cards(deck.to_string(), due, today, config.policy);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut last_round = 0;

    while !session.is_completed() {
        if session.round_number != last_round {
            println!("\n{}", session.phase_message());
            last_round = session.round_number;
        }
        let Some(card) = session.current_card() else {
            break;
        };
        println!("\nQ: {}", card.flashcard.front);
        prompt("Press Enter to show the answer")?;
        if lines.next().transpose()?.is_none() {
            return Ok(());
        }
        session.toggle_answer();
        println!("A: {}", card_back(&session));

        let grade = loop {
            prompt("Grade 0-5")?;
            let Some(line) = lines.next().transpose()? else {
                return Ok(());
            };
            match line.trim().parse::<i64>() {
                Ok(raw) => break Grade::new(raw),
                Err(_) => println!("Enter a number from 0 to 5"),
            }
        };

        if let Some(updated) = session.grade_current_card(grade)? {
            store.save_state(updated.id, &updated.state)?;
            println!(
                "Next review {} ({})",
                updated.state.next_review_date,
                ReviewStatus::of(updated.state.next_review_date, today)
            );
        }
        session.next_card();
    }

    println!("\nSession complete!");
    Ok(())
}

fn card_back(session: &LearningSession) -> String {
    session
        .current_card()
        .map(|card| card.flashcard.back.clone())
        .unwrap_or_default()
}

fn prompt(message: &str) -> io::Result<()> {
    print!("{}: ", message);
    io::stdout().flush()
}

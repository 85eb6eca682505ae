pub mod deck;
pub mod due;
pub mod flashcard;
pub mod grade;
pub mod learning_card;
pub mod learning_session;
pub mod scheduling_state;
pub mod sm2;
pub mod stats;

pub use deck::Deck;
pub use due::{ReviewStatus, Scheduled, ToReviewDate};
pub use flashcard::Flashcard;
pub use grade::Grade;
pub use learning_card::LearningCard;
pub use learning_session::LearningSession;
pub use scheduling_state::{SchedulingState, Stage};
pub use sm2::ReviewPolicy;
pub use stats::ReviewStats;

//! Score and engagement engines for a flashcard study backend.
//!
//! Each engine is a small struct over an injected [`StoreGateway`], the
//! path-addressed document store the backend persists into. Engines return
//! typed results or a typed [`EngineError`]; transport concerns (routing,
//! serialization of responses, authentication) live in the consuming
//! service, not here.
//!
//! ## Example
//!
//! ```ignore
//! use deckscore::{InMemoryStore, LeaderboardEngine};
//!
//! let store = InMemoryStore::new();
//! let leaderboard = LeaderboardEngine::new(store.clone());
//!
//! leaderboard.upsert_score("deck-1", "user-1", "ada@example.com", 12, 3)?;
//! let ranked = leaderboard.get_leaderboard("deck-1")?;
//! ```

mod analytics;
mod error;
mod leaderboard;
mod progress;
mod record;
mod sharing;
mod store;
mod streak;

pub use analytics::{AnalyticsEngine, DeckAnalysis, TrendPoint};
pub use error::EngineError;
pub use leaderboard::{LeaderboardEngine, UserScore};
pub use progress::{ProgressEngine, ProgressPoint};
pub use record::{DeckInfo, LeaderboardEntry, QuizAttempt, StreakRecord};
pub use sharing::{SharedDeck, SharingEngine};
pub use store::{paths, InMemoryStore, StoreError, StoreGateway, Versioned};
pub use streak::StreakEngine;

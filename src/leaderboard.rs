//! Leaderboard engine - per-deck, per-user score records.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;
use crate::record::{decode, encode, LeaderboardEntry};
use crate::store::{paths, StoreError, StoreGateway};

/// A user's score for one deck. Users with no recorded attempts score zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserScore {
    pub correct: u32,
    pub incorrect: u32,
}

/// Ranks and upserts per-deck, per-user score records.
pub struct LeaderboardEngine<S> {
    store: S,
}

impl<S: StoreGateway> LeaderboardEngine<S> {
    pub fn new(store: S) -> Self {
        LeaderboardEngine { store }
    }

    /// Replace the leaderboard entry for (deck, user) with the supplied
    /// totals and a server-generated attempt timestamp.
    ///
    /// The write is a blind replace: concurrent upserts for the same user
    /// race and the last one wins.
    pub fn upsert_score(
        &self,
        deck_id: &str,
        user_id: &str,
        user_email: &str,
        correct: u32,
        incorrect: u32,
    ) -> Result<(), EngineError> {
        self.upsert_score_at(deck_id, user_id, user_email, correct, incorrect, Utc::now())
    }

    /// Same as [`upsert_score`](Self::upsert_score) with an explicit attempt time.
    pub fn upsert_score_at(
        &self,
        deck_id: &str,
        user_id: &str,
        user_email: &str,
        correct: u32,
        incorrect: u32,
        at: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        if user_id.is_empty() {
            return Err(EngineError::InvalidArgument("userId"));
        }

        let entry = LeaderboardEntry {
            user_email: user_email.to_string(),
            correct,
            incorrect,
            last_attempt: server_timestamp(at),
        };
        self.store
            .update(&paths::leaderboard_entry(deck_id, user_id), encode(&entry)?)?;
        debug!("leaderboard entry replaced for deck {} user {}", deck_id, user_id);
        Ok(())
    }

    /// Every entry of a deck, ranked by correct count descending, ties
    /// broken by most recent attempt first. Full ties keep store iteration
    /// order. A deck with no entries yields an empty list.
    pub fn get_leaderboard(&self, deck_id: &str) -> Result<Vec<LeaderboardEntry>, EngineError> {
        let mut entries = deck_entries(&self.store, deck_id)?;
        // stable sort; lexicographic compare on the fixed-width timestamps
        entries.sort_by(|a, b| {
            b.correct
                .cmp(&a.correct)
                .then_with(|| b.last_attempt.cmp(&a.last_attempt))
        });
        Ok(entries)
    }

    /// One user's score for a deck. An absent entry reads as zeros, not as
    /// an error.
    pub fn get_user_score(&self, deck_id: &str, user_id: &str) -> Result<UserScore, EngineError> {
        let path = paths::leaderboard_entry(deck_id, user_id);
        match self.store.get(&path)? {
            Some(value) => {
                let entry: LeaderboardEntry = decode(&path, value)?;
                Ok(UserScore {
                    correct: entry.correct,
                    incorrect: entry.incorrect,
                })
            }
            None => Ok(UserScore::default()),
        }
    }
}

/// All leaderboard entries of a deck in store iteration order. Shared with
/// the analytics engine, which aggregates the same records.
pub(crate) fn deck_entries<S: StoreGateway>(
    store: &S,
    deck_id: &str,
) -> Result<Vec<LeaderboardEntry>, EngineError> {
    let path = paths::leaderboard(deck_id);
    let Some(value) = store.get(&path)? else {
        return Ok(Vec::new());
    };

    let map = match value {
        Value::Object(map) => map,
        _ => {
            return Err(StoreError::Serde(format!("expected object at {}", path)).into());
        }
    };

    let mut entries = Vec::with_capacity(map.len());
    for (user_id, value) in map {
        entries.push(decode(&format!("{}/{}", path, user_id), value)?);
    }
    Ok(entries)
}

fn server_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

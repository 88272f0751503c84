//! Persisted record types.
//!
//! Field names serialize in camelCase to match the persisted layout. Count
//! fields default to zero when absent so partially-populated legacy records
//! read back instead of failing.

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::StoreError;

/// Wire format of attempt timestamps, fixed-width so lexicographic order
/// equals chronological order.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Latest cumulative correct/incorrect tally for one user on one deck.
///
/// At most one entry exists per (deck, user); every score update replaces
/// all four fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub incorrect: u32,
    #[serde(default)]
    pub last_attempt: String,
}

/// One discrete, timestamped recording of a user's counts for a deck.
///
/// Keyed by the sanitized attempt timestamp; `last_attempt` keeps the
/// original unsanitized string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub incorrect: u32,
    #[serde(default)]
    pub last_attempt: String,
}

/// Consecutive-day practice record, one per user across all decks.
///
/// An absent record reads as `{ current_streak: 0, last_practice_date: None }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub last_practice_date: Option<String>,
}

/// Read-only projection of the external deck entity. Only the title is
/// consumed here, for resolving shared deck ids to display names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckInfo {
    #[serde(default)]
    pub title: String,
}

/// Decode a stored document into a record, tagging failures with the path
/// they were read from.
pub(crate) fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Serde(format!("{}: {}", path, e)))
}

/// Encode a record as the JSON object it persists as.
pub(crate) fn encode<T: Serialize>(record: &T) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StoreError::Serde("record must encode to an object".to_string())),
        Err(e) => Err(StoreError::Serde(e.to_string())),
    }
}

/// Parse a stored attempt timestamp. The fractional-second part is optional.
pub(crate) fn parse_timestamp(timestamp: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).ok()
}

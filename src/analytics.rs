//! Analytics engine - deck-wide statistics and per-date performance trends.
//!
//! Aggregates the leaderboard records, which hold only each user's most
//! recent attempt. Trend output therefore reflects latest-attempt dates,
//! not the full attempt history; the progress engine serves per-user
//! history from the quizAttempts records instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::leaderboard::deck_entries;
use crate::record::parse_timestamp;
use crate::store::{StoreError, StoreGateway};

/// Whole-deck score statistics. Averages are arithmetic means over the
/// number of leaderboard entries, not over attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckAnalysis {
    pub total_correct: u64,
    pub total_incorrect: u64,
    pub total_attempts: u64,
    pub avg_correct: f64,
    pub avg_incorrect: f64,
    pub avg_attempts: f64,
}

/// Per-date totals across every user whose latest attempt fell on that date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub correct: u64,
    pub incorrect: u64,
    pub attempts: u64,
}

/// Aggregates deck-wide statistics from leaderboard records.
pub struct AnalyticsEngine<S> {
    store: S,
}

impl<S: StoreGateway> AnalyticsEngine<S> {
    pub fn new(store: S) -> Self {
        AnalyticsEngine { store }
    }

    /// Totals and per-entry averages across a deck's leaderboard.
    ///
    /// A deck with zero entries fails with `NotFound`; that is a distinct
    /// outcome from a deck whose entries sum to zero.
    pub fn get_deck_analysis(&self, deck_id: &str) -> Result<DeckAnalysis, EngineError> {
        let entries = deck_entries(&self.store, deck_id)?;
        if entries.is_empty() {
            return Err(EngineError::NotFound {
                kind: "leaderboard",
                id: deck_id.to_string(),
            });
        }

        let mut total_correct = 0u64;
        let mut total_incorrect = 0u64;
        for entry in &entries {
            total_correct += u64::from(entry.correct);
            total_incorrect += u64::from(entry.incorrect);
        }
        let total_attempts = total_correct + total_incorrect;
        let count = entries.len() as f64;

        Ok(DeckAnalysis {
            total_correct,
            total_incorrect,
            total_attempts,
            avg_correct: total_correct as f64 / count,
            avg_incorrect: total_incorrect as f64 / count,
            avg_attempts: total_attempts as f64 / count,
        })
    }

    /// Score totals grouped by the calendar date of each user's latest
    /// attempt, ascending by date.
    pub fn get_performance_trends(&self, deck_id: &str) -> Result<Vec<TrendPoint>, EngineError> {
        let entries = deck_entries(&self.store, deck_id)?;
        if entries.is_empty() {
            return Err(EngineError::NotFound {
                kind: "leaderboard",
                id: deck_id.to_string(),
            });
        }

        let mut by_date: BTreeMap<String, (u64, u64)> = BTreeMap::new();
        for entry in &entries {
            let date = parse_timestamp(&entry.last_attempt)
                .ok_or_else(|| {
                    StoreError::Serde(format!(
                        "unparseable lastAttempt {:?} in leaderboard/{}",
                        entry.last_attempt, deck_id
                    ))
                })?
                .date()
                .to_string();
            let slot = by_date.entry(date).or_insert((0, 0));
            slot.0 += u64::from(entry.correct);
            slot.1 += u64::from(entry.incorrect);
        }

        Ok(by_date
            .into_iter()
            .map(|(date, (correct, incorrect))| TrendPoint {
                date,
                correct,
                incorrect,
                attempts: correct + incorrect,
            })
            .collect())
    }
}

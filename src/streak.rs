//! Streak engine - consecutive daily practice tracking.
//!
//! One record per user, global across decks. Practicing on the day after
//! the last recorded practice extends the streak; a gap of more than one
//! day resets it to 1. A repeat practice on the same day, or one dated
//! before the last practice (clock skew), leaves the count unchanged but
//! still moves lastPracticeDate forward to the supplied date.

use chrono::{NaiveDate, Utc};
use log::debug;
use serde_json::Value;

use crate::error::EngineError;
use crate::record::{decode, encode, StreakRecord};
use crate::store::{paths, StoreError, StoreGateway, Versioned};

/// Tracks consecutive daily practice per user.
pub struct StreakEngine<S> {
    store: S,
}

impl<S: StoreGateway> StreakEngine<S> {
    pub fn new(store: S) -> Self {
        StreakEngine { store }
    }

    /// Log a practice event dated today and return the updated record.
    pub fn log_practice(&self, user_id: &str, deck_id: &str) -> Result<StreakRecord, EngineError> {
        self.log_practice_on(user_id, deck_id, Utc::now().date_naive())
    }

    /// Same as [`log_practice`](Self::log_practice) with an explicit
    /// practice date.
    ///
    /// The read-modify-write is guarded by the store's version counter, so
    /// a concurrent update of the same record surfaces as
    /// [`StoreError::Conflict`] instead of being silently lost.
    pub fn log_practice_on(
        &self,
        user_id: &str,
        deck_id: &str,
        today: NaiveDate,
    ) -> Result<StreakRecord, EngineError> {
        if user_id.is_empty() {
            return Err(EngineError::InvalidArgument("userId"));
        }

        let path = paths::streak(user_id);
        let Versioned { data, version } = self.store.get_versioned(&path)?;
        let mut record = match data {
            Some(value) => decode(&path, value)?,
            None => StreakRecord::default(),
        };

        match record.last_practice_date.as_deref().map(parse_date).transpose()? {
            None => record.current_streak = 1,
            Some(last) => {
                let gap = (today - last).num_days();
                if gap == 1 {
                    record.current_streak += 1;
                } else if gap > 1 {
                    record.current_streak = 1;
                }
                // gap <= 0: same-day repeat or clock skew, count stays as is
            }
        }
        record.last_practice_date = Some(today.to_string());

        self.store
            .set_versioned(&path, Value::Object(encode(&record)?), version)?;
        debug!(
            "practice logged for user {} on deck {}, streak now {}",
            user_id, deck_id, record.current_streak
        );
        Ok(record)
    }

    /// Current streak for a user. An absent record reads as a zero streak,
    /// not as an error.
    pub fn get_streak(&self, user_id: &str) -> Result<StreakRecord, EngineError> {
        let path = paths::streak(user_id);
        match self.store.get(&path)? {
            Some(value) => Ok(decode(&path, value)?),
            None => Ok(StreakRecord::default()),
        }
    }
}

fn parse_date(date: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| StoreError::Serde(format!("bad lastPracticeDate {:?}: {}", date, e)))
}

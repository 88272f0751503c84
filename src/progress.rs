//! Progress engine - per-user quiz attempt history.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;
use crate::record::{decode, encode, parse_timestamp, QuizAttempt};
use crate::store::{paths, StoreError, StoreGateway};

/// One attempt in a user's history, with the calendar date split out for
/// timeseries consumers. `date` is None when the stored timestamp does not
/// parse; the attempt is still included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPoint {
    pub user_email: String,
    pub correct: u32,
    pub incorrect: u32,
    pub last_attempt: String,
    pub date: Option<String>,
    pub total_attempts: u32,
}

/// Records quiz attempts and reconstructs per-user timeseries from them.
///
/// Unlike the analytics engine, which sees only each user's latest tally,
/// this engine reads the full append-only attempt history.
pub struct ProgressEngine<S> {
    store: S,
}

impl<S: StoreGateway> ProgressEngine<S> {
    pub fn new(store: S) -> Self {
        ProgressEngine { store }
    }

    /// Store one attempt under its sanitized timestamp key.
    ///
    /// `last_attempt` is the caller's attempt timestamp and persists
    /// unmodified; only the path key is sanitized. Two attempts whose
    /// timestamps sanitize to the same key silently overwrite.
    pub fn record_attempt(
        &self,
        deck_id: &str,
        user_id: &str,
        user_email: &str,
        correct: u32,
        incorrect: u32,
        last_attempt: &str,
    ) -> Result<(), EngineError> {
        if user_id.is_empty() {
            return Err(EngineError::InvalidArgument("userId"));
        }
        if last_attempt.is_empty() {
            return Err(EngineError::InvalidArgument("lastAttempt"));
        }

        let attempt = QuizAttempt {
            user_email: user_email.to_string(),
            correct,
            incorrect,
            last_attempt: last_attempt.to_string(),
        };
        let key = paths::sanitize_key(last_attempt);
        self.store.set(
            &paths::quiz_attempt(deck_id, user_id, &key),
            Value::Object(encode(&attempt)?),
        )?;
        debug!("attempt recorded for deck {} user {} at {}", deck_id, user_id, last_attempt);
        Ok(())
    }

    /// Full attempt history for one user on one deck, in attempt-key order
    /// (chronological for same-timezone timestamps).
    ///
    /// A user with no attempts node fails with `NotFound`; a node whose
    /// attempts were all removed yields an empty list.
    pub fn get_user_progress(
        &self,
        deck_id: &str,
        user_id: &str,
    ) -> Result<Vec<ProgressPoint>, EngineError> {
        let path = paths::quiz_attempts(deck_id, user_id);
        let Some(value) = self.store.get(&path)? else {
            return Err(EngineError::NotFound {
                kind: "quizAttempts",
                id: format!("{}/{}", deck_id, user_id),
            });
        };

        let map = match value {
            Value::Object(map) => map,
            _ => {
                return Err(StoreError::Serde(format!("expected object at {}", path)).into());
            }
        };

        let mut points = Vec::with_capacity(map.len());
        for (key, value) in map {
            let attempt: QuizAttempt = decode(&format!("{}/{}", path, key), value)?;
            // the trailing Z is a UTC marker, not part of the parseable form
            let timestamp = attempt.last_attempt.trim_end_matches('Z');
            let date = parse_timestamp(timestamp).map(|parsed| parsed.date().to_string());
            points.push(ProgressPoint {
                user_email: attempt.user_email,
                correct: attempt.correct,
                incorrect: attempt.incorrect,
                last_attempt: timestamp.to_string(),
                date,
                total_attempts: attempt.correct + attempt.incorrect,
            });
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn engine() -> ProgressEngine<InMemoryStore> {
        ProgressEngine::new(InMemoryStore::new())
    }

    #[test]
    fn attempts_come_back_in_chronological_order() {
        let engine = engine();
        engine
            .record_attempt("d1", "u1", "u1@example.com", 3, 2, "2024-06-02T09:00:00.000000Z")
            .unwrap();
        engine
            .record_attempt("d1", "u1", "u1@example.com", 1, 4, "2024-06-01T20:00:00.000000Z")
            .unwrap();

        let progress = engine.get_user_progress("d1", "u1").unwrap();
        assert_eq!(progress.len(), 2);
        assert_eq!(progress[0].date.as_deref(), Some("2024-06-01"));
        assert_eq!(progress[0].total_attempts, 5);
        assert_eq!(progress[1].date.as_deref(), Some("2024-06-02"));
        assert_eq!(progress[1].total_attempts, 5);
    }

    #[test]
    fn trailing_utc_marker_is_stripped() {
        let engine = engine();
        engine
            .record_attempt("d1", "u1", "u1@example.com", 2, 0, "2024-06-01T08:30:00Z")
            .unwrap();

        let progress = engine.get_user_progress("d1", "u1").unwrap();
        assert_eq!(progress[0].last_attempt, "2024-06-01T08:30:00");
        assert_eq!(progress[0].date.as_deref(), Some("2024-06-01"));
    }

    #[test]
    fn unparseable_timestamp_keeps_the_attempt_without_a_date() {
        let engine = engine();
        engine
            .record_attempt("d1", "u1", "u1@example.com", 1, 1, "whenever")
            .unwrap();

        let progress = engine.get_user_progress("d1", "u1").unwrap();
        assert_eq!(progress.len(), 1);
        assert!(progress[0].date.is_none());
        assert_eq!(progress[0].last_attempt, "whenever");
    }

    #[test]
    fn colliding_sanitized_keys_overwrite() {
        let engine = engine();
        // distinct raw timestamps, identical once ':' and '.' become '-'
        engine
            .record_attempt("d1", "u1", "u1@example.com", 1, 0, "2024-06-01T08:30:00.000000")
            .unwrap();
        engine
            .record_attempt("d1", "u1", "u1@example.com", 9, 9, "2024-06-01T08:30:00-000000")
            .unwrap();

        let progress = engine.get_user_progress("d1", "u1").unwrap();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].correct, 9);
    }

    #[test]
    fn no_attempts_is_not_found() {
        let engine = engine();
        let err = engine.get_user_progress("d1", "ghost").unwrap_err();
        assert_eq!(
            err,
            EngineError::NotFound {
                kind: "quizAttempts",
                id: "d1/ghost".to_string(),
            }
        );
    }

    #[test]
    fn record_attempt_validates_inputs() {
        let engine = engine();
        assert_eq!(
            engine
                .record_attempt("d1", "", "x@example.com", 1, 0, "2024-06-01T08:30:00")
                .unwrap_err(),
            EngineError::InvalidArgument("userId")
        );
        assert_eq!(
            engine
                .record_attempt("d1", "u1", "x@example.com", 1, 0, "")
                .unwrap_err(),
            EngineError::InvalidArgument("lastAttempt")
        );
    }
}

//! Path construction for the persisted layout.
//!
//! Layout under the document store:
//!
//! - `leaderboard/{deckId}/{userId}` - latest score tally per user
//! - `quizAttempts/{deckId}/{userId}/{sanitizedTimestamp}` - attempt history
//! - `streaks/{userId}` - consecutive-day practice record
//! - `sharing/{userId}` - list of deck ids shared with the user
//! - `deck/{deckId}` - deck entity, read here only to resolve titles

/// Path to every leaderboard entry of a deck.
pub fn leaderboard(deck_id: &str) -> String {
    format!("leaderboard/{}", deck_id)
}

/// Path to one user's leaderboard entry.
pub fn leaderboard_entry(deck_id: &str, user_id: &str) -> String {
    format!("leaderboard/{}/{}", deck_id, user_id)
}

/// Path to one user's attempt history for a deck.
pub fn quiz_attempts(deck_id: &str, user_id: &str) -> String {
    format!("quizAttempts/{}/{}", deck_id, user_id)
}

/// Path to a single stored attempt.
pub fn quiz_attempt(deck_id: &str, user_id: &str, attempt_key: &str) -> String {
    format!("quizAttempts/{}/{}/{}", deck_id, user_id, attempt_key)
}

/// Path to a user's streak record.
pub fn streak(user_id: &str) -> String {
    format!("streaks/{}", user_id)
}

/// Path to a user's sharing set.
pub fn sharing(user_id: &str) -> String {
    format!("sharing/{}", user_id)
}

/// Path to a deck entity.
pub fn deck(deck_id: &str) -> String {
    format!("deck/{}", deck_id)
}

/// Make a timestamp usable as a path key by replacing the characters the
/// store forbids in keys (`:` and `.`) with `-`.
///
/// Distinct timestamps can collide after sanitization; the caller overwrites
/// on collision.
pub fn sanitize_key(timestamp: &str) -> String {
    timestamp.replace([':', '.'], "-")
}

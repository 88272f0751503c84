//! StoreGateway - Abstract path-addressed document storage.

use serde_json::{Map, Value};

use super::{StoreError, Versioned};

/// Abstract path-addressed document storage.
///
/// Paths are slash-separated strings (`"leaderboard/deck-1/user-1"`). A
/// value written at a path reads back at that path; reading an interior
/// path returns the whole subtree as a JSON object whose children iterate
/// in key order. No operation is transactional across paths.
pub trait StoreGateway: Send + Sync {
    /// Get the value at a path. Returns None if nothing is stored there.
    fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Write a value at a path, replacing whatever was there.
    fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Shallow-merge a partial object into the object at a path, creating
    /// it if absent.
    fn update(&self, path: &str, partial: Map<String, Value>) -> Result<(), StoreError>;

    /// Append a value under a server-generated key and return the key.
    /// Generated keys sort lexicographically in generation order.
    fn push(&self, path: &str, value: Value) -> Result<String, StoreError>;

    /// Remove the value at a path. Removing an absent path is a no-op.
    fn remove(&self, path: &str) -> Result<(), StoreError>;

    /// Children of a path whose `field` equals `value`, in key order.
    fn query_equal(
        &self,
        path: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Value)>, StoreError>;

    /// Get the value at a path along with its version counter.
    ///
    /// Versions are tracked per exact path and start at 0 for a path that
    /// has never been written; writes to child paths do not disturb an
    /// ancestor's version.
    fn get_versioned(&self, path: &str) -> Result<Versioned<Option<Value>>, StoreError>;

    /// Write a value at a path only if its current version matches
    /// `expected_version`, otherwise fail with [`StoreError::Conflict`].
    /// Returns the new version.
    fn set_versioned(
        &self,
        path: &str,
        value: Value,
        expected_version: u64,
    ) -> Result<u64, StoreError>;
}

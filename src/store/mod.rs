//! Store gateway - path-addressed document storage.
//!
//! The backend persists into a remote hierarchical document store addressed
//! by slash-separated paths. Engines consume that store through the
//! [`StoreGateway`] trait; [`InMemoryStore`] is the bundled implementation
//! used by tests and local development.
//!
//! ## Example
//!
//! ```ignore
//! use deckscore::{InMemoryStore, StoreGateway};
//! use serde_json::json;
//!
//! let store = InMemoryStore::new();
//! store.set("deck/deck-1", json!({ "title": "Spanish 101" }))?;
//! let deck = store.get("deck/deck-1")?;
//! ```

mod gateway;
mod in_memory;
pub mod paths;

use std::fmt;

pub use gateway::StoreGateway;
pub use in_memory::InMemoryStore;

/// A versioned wrapper around a stored value for optimistic concurrency control.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// Error type for store gateway operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A lock guarding the store was poisoned.
    LockPoisoned(&'static str),
    /// A stored document failed to serialize or deserialize.
    Serde(String),
    /// Optimistic concurrency conflict on a versioned write.
    Conflict {
        path: String,
        expected: u64,
        actual: u64,
    },
    /// The backing store failed or timed out.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
            StoreError::Serde(msg) => write!(f, "store serde error: {}", msg),
            StoreError::Conflict {
                path,
                expected,
                actual,
            } => write!(
                f,
                "concurrent write detected at {} (expected version {}, actual {})",
                path, expected, actual
            ),
            StoreError::Backend(msg) => write!(f, "store backend error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

//! Error types for engine operations.

use std::error::Error;
use std::fmt;

use crate::store::StoreError;

/// Error type for engine operations.
///
/// Absent records on read-for-default operations (user score, streak) are
/// not errors; those operations return zero-valued defaults instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A required input field is missing or malformed.
    InvalidArgument(&'static str),
    /// A record whose presence is required is absent.
    NotFound { kind: &'static str, id: String },
    /// The record already exists where the operation requires absence.
    AlreadyExists { kind: &'static str, id: String },
    /// The underlying store call failed.
    Store(StoreError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidArgument(field) => {
                write!(f, "invalid argument: {}", field)
            }
            EngineError::NotFound { kind, id } => write!(f, "not found: {}:{}", kind, id),
            EngineError::AlreadyExists { kind, id } => {
                write!(f, "already exists: {}:{}", kind, id)
            }
            EngineError::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EngineError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        EngineError::Store(err)
    }
}

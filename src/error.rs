//! Error types for quad store operations

use thiserror::Error;

/// Result type alias for quad store operations
pub type Result<T> = std::result::Result<T, QuadStoreError>;

/// Main error type for quad store operations
#[derive(Error, Debug)]
pub enum QuadStoreError {
    /// A term id, table or store that should exist does not
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store is not in a state that permits the operation (e.g. closed)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A physical index holds a key that cannot be decoded, or the indices disagree
    #[error("Index corruption detected in {index}: {details}")]
    IndexCorrupted {
        /// Name of the physical index
        index: String,
        /// What was wrong with it
        details: String,
    },

    /// Failure reported by the key-value substrate
    #[error("Storage error: {0}")]
    Storage(String),

    /// Term or table serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuadStoreError {
    pub(crate) fn corrupted(index: &str, details: impl Into<String>) -> Self {
        QuadStoreError::IndexCorrupted { index: index.to_string(), details: details.into() }
    }
}

impl From<serde_json::Error> for QuadStoreError {
    fn from(err: serde_json::Error) -> Self {
        QuadStoreError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for QuadStoreError {
    fn from(err: bincode::Error) -> Self {
        QuadStoreError::Serialization(err.to_string())
    }
}

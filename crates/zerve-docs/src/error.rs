//! Error types for doc operations.

use thiserror::Error;

/// Errors that can occur during doc operations.
#[derive(Debug, Error)]
pub enum DocError {
    /// The doc was not found.
    #[error("doc not found: {name}")]
    NotFound { name: String },

    /// The doc name is invalid.
    #[error("invalid doc name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error in doc {name}: {reason}")]
    Serialization { name: String, reason: String },

    /// An in-memory lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    Poisoned(String),

    /// I/O error during file-based doc operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Error opening the shared trash.
    #[error("store error: {0}")]
    Store(#[from] zerve_store::StoreError),
}

/// Convenience type alias for doc operations.
pub type Result<T> = std::result::Result<T, DocError>;

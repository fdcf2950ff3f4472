use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("expected a value of type {expected}, found {found}")]
    UnexpectedType { expected: &'static str, found: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

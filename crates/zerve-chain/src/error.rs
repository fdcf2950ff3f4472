use zerve_docs::DocError;
use zerve_store::StoreError;

/// Errors produced by chain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// `appendChain` was called on a doc that does not hold a chain head.
    #[error("doc {name:?} is not a chain: expected a BlockRef to a Commit, found {found}")]
    TypeMismatch { name: String, found: String },

    /// The chain's links are malformed (cycle, undecodable commit, too deep).
    #[error("corrupt chain at {at}: {reason}")]
    ChainCorrupt { at: String, reason: String },

    /// The head kept moving under concurrent appends.
    #[error("append to {name:?} lost the head race {attempts} times")]
    ConcurrentAppend { name: String, attempts: u32 },

    /// A registered reducer rejected its action.
    #[error("reducer for {action} failed: {reason}")]
    Reducer { action: String, reason: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("doc error: {0}")]
    Doc(#[from] DocError),
}

/// Result alias for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

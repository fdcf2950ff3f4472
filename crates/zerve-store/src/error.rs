use zerve_types::BlockId;

/// Errors from block store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested block was not found.
    #[error("block not found: {0}")]
    NotFound(BlockId),

    /// A block file already exists under this id with different bytes.
    /// Fatal: the store refuses to overwrite it.
    #[error("integrity violation for {id}: stored {stored_len} bytes differ from the {expected_len} bytes being written")]
    IntegrityViolation {
        id: BlockId,
        stored_len: usize,
        expected_len: usize,
    },

    /// Stored bytes no longer hash to their id.
    #[error("hash mismatch for {id}: stored content hashes to {computed}")]
    HashMismatch { id: BlockId, computed: BlockId },

    /// The block bytes are not valid JSON.
    #[error("corrupt block {id}: {reason}")]
    CorruptBlock { id: BlockId, reason: String },

    /// The content could not be written in canonical form.
    #[error("cannot canonicalize block content: {0}")]
    Canonicalize(#[from] serde_json::Error),

    /// Trash entry not found.
    #[error("trash entry not found: {0}")]
    TrashNotFound(String),

    /// An in-memory lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    Poisoned(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

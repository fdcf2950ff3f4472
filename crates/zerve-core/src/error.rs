use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("invalid payload for {action}: {reason}")]
    InvalidPayload { action: String, reason: String },

    #[error("unsupported path {path:?}: {reason}")]
    UnsupportedPath { path: String, reason: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] zerve_store::StoreError),

    #[error("doc error: {0}")]
    Doc(#[from] zerve_docs::DocError),

    #[error("chain error: {0}")]
    Chain(#[from] zerve_chain::ChainError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

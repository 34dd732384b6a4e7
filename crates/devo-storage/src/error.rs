//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while talking to the job transport.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to configure transport client: {0}")]
    ConfigError(String),

    #[error("Transport returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport rejected request: {0}")]
    Rejected(String),

    #[error("Transport accepted upload without a job id")]
    MissingJobId,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }
}

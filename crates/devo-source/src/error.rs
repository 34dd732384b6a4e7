//! Source provider error types.

use thiserror::Error;

pub type SourceResult<T> = Result<T, SourceError>;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Liturgy API returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("No {0} reading available for this date")]
    MissingReading(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider failed: {0}")]
    Provider(String),

    #[error("All source providers failed (primary: {primary}; fallback: {fallback})")]
    Exhausted { primary: String, fallback: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SourceError {
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }
}

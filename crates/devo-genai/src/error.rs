//! Generative backend error types.

use thiserror::Error;

use crate::types::ErrorEnvelope;

pub type GenAiResult<T> = Result<T, GenAiError>;

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Service unavailable ({status}): {message}")]
    ServiceUnavailable { status: u16, message: String },

    #[error("Request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("No {0} data returned")]
    NoData(&'static str),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl GenAiError {
    /// Classify a non-success HTTP response.
    ///
    /// HTTP 429 or an error body with status `RESOURCE_EXHAUSTED` is a quota
    /// error; 5xx is retryable; anything else is a plain request failure.
    pub fn from_response(status: u16, body: &str) -> Self {
        let (message, api_status) = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => (envelope.error.message, envelope.error.status),
            Err(_) => (body.to_string(), None),
        };

        if status == 429 || api_status.as_deref() == Some("RESOURCE_EXHAUSTED") {
            GenAiError::QuotaExceeded(message)
        } else if status >= 500 {
            GenAiError::ServiceUnavailable { status, message }
        } else {
            GenAiError::RequestFailed { status, message }
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, GenAiError::QuotaExceeded(_))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenAiError::ServiceUnavailable { .. } | GenAiError::Network(_)
        )
    }
}

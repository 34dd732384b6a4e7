//! Worker error types.

use devo_models::{BlockId, MediaKind, ProcessingState, TransitionError};
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Failed to fetch source text: {0}")]
    SourceFetch(#[from] devo_source::SourceError),

    #[error("Script generation failed: {0}")]
    ScriptGeneration(String),

    #[error("Quota exceeded while generating {kind} for {block}: {message}")]
    QuotaExceeded {
        block: BlockId,
        kind: MediaKind,
        message: String,
    },

    #[error("Timeline generation failed: {0}")]
    Timeline(#[from] devo_media::MediaError),

    #[error("Transport error: {0}")]
    Transport(#[from] devo_storage::StorageError),

    #[error("Session is busy ({0})")]
    Busy(ProcessingState),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("No source text fetched yet")]
    MissingSource,

    #[error("No script generated yet")]
    MissingScript,

    #[error("Another session operation is in progress")]
    OperationInProgress,
}

impl WorkerError {
    pub fn script_generation(msg: impl Into<String>) -> Self {
        Self::ScriptGeneration(msg.into())
    }

    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, WorkerError::QuotaExceeded { .. })
    }

    /// Suggested operator action, when there is a specific one.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            WorkerError::QuotaExceeded { .. } => Some(
                "Select or re-authorize an API key with available quota (GEMINI_API_KEY), then acknowledge and retry",
            ),
            WorkerError::MissingSource => Some("Fetch the reading before generating a script"),
            WorkerError::MissingScript => Some("Generate a script before generating media"),
            WorkerError::Busy(_) | WorkerError::OperationInProgress => {
                Some("Wait for the current operation to finish")
            }
            _ => None,
        }
    }
}

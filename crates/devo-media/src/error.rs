//! Error types for media operations.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while measuring audio or handling subtitles.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Empty audio clip")]
    EmptyAudio,

    #[error("PCM clip has odd byte length: {0}")]
    TruncatedPcm(usize),

    #[error("WAV parse error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("Duration is not finite: {0}")]
    NonFiniteDuration(f64),

    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),

    #[error("Malformed subtitle track: {0}")]
    MalformedSubtitles(String),
}

impl MediaError {
    /// Create a malformed subtitle error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedSubtitles(message.into())
    }
}

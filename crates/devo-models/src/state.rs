//! Processing state machine and per-block status.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Session-wide processing state. Exactly one value is live at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
    #[default]
    Idle,
    FetchingSource,
    GeneratingScript,
    GeneratingMedia,
    Uploading,
    Complete,
    Error,
}

impl ProcessingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingState::Idle => "idle",
            ProcessingState::FetchingSource => "fetching_source",
            ProcessingState::GeneratingScript => "generating_script",
            ProcessingState::GeneratingMedia => "generating_media",
            ProcessingState::Uploading => "uploading",
            ProcessingState::Complete => "complete",
            ProcessingState::Error => "error",
        }
    }

    /// Whether an operation is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            ProcessingState::FetchingSource
                | ProcessingState::GeneratingScript
                | ProcessingState::GeneratingMedia
                | ProcessingState::Uploading
        )
    }

    /// `Complete` and `Error` end a cycle and wait for acknowledgment.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingState::Complete | ProcessingState::Error)
    }

    /// Explicit transition table.
    pub fn can_transition_to(&self, next: ProcessingState) -> bool {
        use ProcessingState::*;
        matches!(
            (self, next),
            (Idle, FetchingSource)
                | (Idle, GeneratingScript)
                | (Idle, GeneratingMedia)
                | (FetchingSource, Idle)
                | (FetchingSource, Error)
                | (GeneratingScript, Idle)
                | (GeneratingScript, Error)
                | (GeneratingMedia, Uploading)
                | (GeneratingMedia, Error)
                | (Uploading, Complete)
                | (Uploading, Error)
                | (Complete, Idle)
                | (Error, Idle)
        )
    }

    /// Validated transition.
    pub fn transition(self, next: ProcessingState) -> Result<ProcessingState, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError { from: self, to: next })
        }
    }
}

impl fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid state transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: ProcessingState,
    pub to: ProcessingState,
}

/// Status of one block during a media generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockStatus {
    #[default]
    Pending,
    GeneratingAudio,
    GeneratingImage,
    Done,
    Error,
}

impl BlockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockStatus::Pending => "pending",
            BlockStatus::GeneratingAudio => "generating_audio",
            BlockStatus::GeneratingImage => "generating_image",
            BlockStatus::Done => "done",
            BlockStatus::Error => "error",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, BlockStatus::Done | BlockStatus::Error)
    }
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

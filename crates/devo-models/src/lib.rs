//! Shared data models for the Devo Studio asset pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - The five-block narrative script
//! - Generated assets and the in-memory asset cache
//! - Job payloads handed to the transport
//! - Processing and per-block states
//! - Progress snapshots and the session activity log

pub mod activity;
pub mod asset;
pub mod payload;
pub mod progress;
pub mod script;
pub mod state;
pub mod style;

// Re-export common types
pub use activity::{preview, ActivityLog, LogEntry, LogLevel, DEFAULT_ACTIVITY_CAPACITY};
pub use asset::{Asset, AssetCache, AssetKind, MediaKind, SUBTITLE_BLOCK_ID};
pub use payload::{JobId, JobMetadata, JobPayload, JobSummary};
pub use progress::ProgressSnapshot;
pub use script::{BlockId, NarrativeBlock, Script, ScriptBlock};
pub use state::{BlockStatus, ProcessingState, TransitionError};
pub use style::{AspectRatio, IntroStyle, MediaSettings, ReadingCategory, VisualStyle, VoiceOption};

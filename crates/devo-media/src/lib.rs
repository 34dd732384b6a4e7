//! Media measurement and timeline building.
//!
//! This crate provides:
//! - Audio duration probing for synthesized speech clips
//! - Subtitle (SRT) timeline construction from measured durations
//! - SRT timestamp formatting and parsing

pub mod error;
pub mod probe;
pub mod subtitles;

pub use error::{MediaError, MediaResult};
pub use probe::{probe_duration_ms, FALLBACK_DURATION_MS, SPEECH_SAMPLE_RATE};
pub use subtitles::{build_subtitles, format_srt_timestamp, parse_srt_timestamp, Cue, SubtitleTrack};

//! Client for the generative backend.
//!
//! This crate provides the collaborator seams used by the pipeline and their
//! HTTP implementation on top of the `generateContent` endpoint:
//! - [`SpeechSynthesizer`] and [`ImageSynthesizer`] for per-block media
//! - [`ScriptWriter`] for the narrative blocks
//! - [`GeminiSearchSource`], the search-grounded reading fallback
//!
//! Quota exhaustion is reported as [`GenAiError::QuotaExceeded`] and is never
//! retried.

pub mod client;
pub mod error;
pub mod script;
pub mod search;
pub mod synth;
pub mod types;

pub use client::{GeminiClient, GeminiConfig};
pub use error::{GenAiError, GenAiResult};
pub use script::{GeneratedScript, ScriptWriter};
pub use search::GeminiSearchSource;
pub use synth::{image_prompt, ImageSynthesizer, SpeechSynthesizer};

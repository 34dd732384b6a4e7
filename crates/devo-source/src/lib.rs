//! Source text for the daily devotional.
//!
//! This crate provides:
//! - The [`SourceTextProvider`] seam and a primary/fallback [`TieredSource`]
//! - An HTTP client for the daily liturgy API
//! - Reading text cleanup and the liturgical proclamation formatter

pub mod client;
pub mod error;
pub mod provider;
pub mod reading;

pub use client::{LiturgyApiClient, LiturgyApiConfig};
pub use error::{SourceError, SourceResult};
pub use provider::{SourceText, SourceTextProvider, TieredSource};
pub use reading::{clean_reading_text, format_liturgical_reading, ReadingReference};

//! Job transport.
//!
//! This crate provides:
//! - The [`JobTransport`] seam (upload, list, fetch)
//! - An HTTP client for the spreadsheet web-app endpoint that stores jobs

pub mod client;
pub mod error;
pub mod transport;

pub use client::{AppsScriptClient, AppsScriptConfig};
pub use error::{StorageError, StorageResult};
pub use transport::JobTransport;

//! Devotional reel production session.
//!
//! This crate provides:
//! - The processing state machine and session operations
//! - Asset orchestration over the speech and image backends
//! - Payload assembly with a rebuilt subtitle track
//! - State, cache and progress observation

pub mod assembler;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod observer;
pub mod orchestrator;
pub mod session;

pub use assembler::assemble_payload;
pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::CycleLogger;
pub use observer::{BlockStatusMap, SessionObserver, SessionPublisher};
pub use orchestrator::{plan_units, AssetFailure, AssetOrchestrator, MediaReport, SynthesisUnit};
pub use session::{Services, Session, SessionHandle};

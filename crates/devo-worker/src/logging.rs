//! Per-operation logging for the process log.

use devo_models::ProgressSnapshot;
use tracing::{debug, error, info, warn, Span};
use uuid::Uuid;

use crate::orchestrator::SynthesisUnit;

/// Tags every tracing event of one session operation with a cycle id, so a
/// single fetch, script or media run can be filtered out of the process log.
/// The session activity log stays human-oriented and carries no ids.
#[derive(Debug, Clone)]
pub struct CycleLogger {
    cycle_id: Uuid,
    operation: &'static str,
}

impl CycleLogger {
    pub fn new(operation: &'static str) -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            operation,
        }
    }

    pub fn log_start(&self, subject: &str) {
        info!(
            cycle_id = %self.cycle_id,
            operation = self.operation,
            subject = %subject,
            "Cycle operation started"
        );
    }

    /// One synthesis unit finished (generated, cached or soft-failed).
    pub fn log_progress(&self, unit: SynthesisUnit, progress: &ProgressSnapshot) {
        debug!(
            cycle_id = %self.cycle_id,
            operation = self.operation,
            block_id = %unit.block,
            kind = %unit.kind,
            done = progress.done,
            total = progress.total,
            percent = progress.percent,
            eta_ms = progress.estimated_remaining_ms,
            "Synthesis unit finished"
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            cycle_id = %self.cycle_id,
            operation = self.operation,
            "Cycle warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            cycle_id = %self.cycle_id,
            operation = self.operation,
            "Cycle failed: {}", message
        );
    }

    pub fn log_completion(&self, outcome: &str) {
        info!(
            cycle_id = %self.cycle_id,
            operation = self.operation,
            outcome = %outcome,
            "Cycle operation completed"
        );
    }

    pub fn cycle_id(&self) -> Uuid {
        self.cycle_id
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Span for the operation's future; nested events inherit the cycle id.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "cycle",
            cycle_id = %self.cycle_id,
            operation = self.operation
        )
    }
}

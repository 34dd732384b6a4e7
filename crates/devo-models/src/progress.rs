//! Progress snapshots published during media generation.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Immutable view of media generation progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ProgressSnapshot {
    /// Units attempted so far
    pub done: u32,

    /// Units planned for the run
    pub total: u32,

    /// 0-100
    pub percent: u8,

    /// Estimated time left, in milliseconds
    pub estimated_remaining_ms: u64,
}

impl ProgressSnapshot {
    /// Compute a snapshot after `done` of `total` units took `elapsed`.
    ///
    /// The remaining time is `elapsed / done * (total - done)`.
    pub fn compute(done: u32, total: u32, elapsed: Duration) -> Self {
        let done = done.min(total);
        let percent = if total == 0 {
            100
        } else {
            ((done as u64 * 100) / total as u64).min(100) as u8
        };
        let estimated_remaining_ms = if done == 0 {
            0
        } else {
            let per_unit = elapsed.as_millis() / done as u128;
            (per_unit * (total - done) as u128).min(u64::MAX as u128) as u64
        };

        Self {
            done,
            total,
            percent,
            estimated_remaining_ms,
        }
    }

    pub fn estimated_remaining(&self) -> Duration {
        Duration::from_millis(self.estimated_remaining_ms)
    }

    pub fn is_finished(&self) -> bool {
        self.done >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_estimate() {
        let p = ProgressSnapshot::compute(2, 10, Duration::from_secs(4));
        assert_eq!(p.percent, 20);
        assert_eq!(p.estimated_remaining(), Duration::from_secs(16));
        assert!(!p.is_finished());
    }

    #[test]
    fn test_compute_clamps() {
        let p = ProgressSnapshot::compute(12, 10, Duration::from_secs(1));
        assert_eq!(p.done, 10);
        assert_eq!(p.percent, 100);
        assert_eq!(p.estimated_remaining_ms, 0);
        assert!(p.is_finished());
    }

    #[test]
    fn test_compute_empty_run() {
        let p = ProgressSnapshot::compute(0, 0, Duration::ZERO);
        assert_eq!(p.percent, 100);
        assert!(p.is_finished());
    }
}

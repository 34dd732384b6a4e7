//! Pipeline metrics.
//!
//! Only the `metrics` facade is used; the embedding process decides whether
//! to install a recorder.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const SYNTHESIS_CALLS_TOTAL: &str = "devo_synthesis_calls_total";
    pub const SYNTHESIS_DURATION_SECONDS: &str = "devo_synthesis_duration_seconds";
    pub const CACHE_HITS_TOTAL: &str = "devo_cache_hits_total";
    pub const UPLOADS_TOTAL: &str = "devo_uploads_total";
}

/// Outcome label of a synthesis call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisOutcome {
    Success,
    Failure,
    Quota,
}

impl SynthesisOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SynthesisOutcome::Success => "success",
            SynthesisOutcome::Failure => "failure",
            SynthesisOutcome::Quota => "quota",
        }
    }
}

/// Record one synthesis call.
pub fn record_synthesis(kind: &str, outcome: SynthesisOutcome, duration_secs: f64) {
    let labels = [
        ("kind", kind.to_string()),
        ("outcome", outcome.as_str().to_string()),
    ];

    counter!(names::SYNTHESIS_CALLS_TOTAL, &labels).increment(1);
    histogram!(names::SYNTHESIS_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a unit served from the asset cache.
pub fn record_cache_hit(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::CACHE_HITS_TOTAL, &labels).increment(1);
}

/// Record an upload attempt.
pub fn record_upload(replace: bool, success: bool) {
    let labels = [
        ("replace", replace.to_string()),
        ("status", if success { "success" } else { "failure" }.to_string()),
    ];
    counter!(names::UPLOADS_TOTAL, &labels).increment(1);
}

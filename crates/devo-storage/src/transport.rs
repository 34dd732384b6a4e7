//! Transport seam.

use async_trait::async_trait;
use devo_models::{JobId, JobPayload, JobSummary};

use crate::error::StorageResult;

/// Persists job payloads for the downstream renderer.
#[async_trait]
pub trait JobTransport: Send + Sync {
    /// Store a payload. When `payload.job_id` is set the existing job is
    /// replaced; the returned id identifies the stored job either way.
    async fn upload(&self, payload: &JobPayload) -> StorageResult<JobId>;

    /// List stored jobs.
    async fn list(&self) -> StorageResult<Vec<JobSummary>>;

    /// Fetch a stored payload.
    async fn fetch(&self, id: &JobId) -> StorageResult<JobPayload>;
}

//! HTTP client for the job storage web app.

use std::time::Duration;

use async_trait::async_trait;
use devo_models::{JobId, JobPayload, JobSummary};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::transport::JobTransport;

/// Configuration for the storage web app client.
#[derive(Debug, Clone)]
pub struct AppsScriptConfig {
    /// Deployed web app URL
    pub url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl AppsScriptConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            url: std::env::var("TRANSPORT_URL")
                .map_err(|_| StorageError::config_error("TRANSPORT_URL not set"))?,
            timeout: Duration::from_secs(
                std::env::var("TRANSPORT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
        })
    }
}

/// Common response envelope.
#[derive(Debug, Deserialize)]
struct TransportResponse {
    status: String,
    #[serde(default)]
    job_id: Option<String>,
    #[serde(default)]
    jobs: Option<Vec<JobSummary>>,
    #[serde(default)]
    message: Option<String>,
}

impl TransportResponse {
    fn into_success(self) -> StorageResult<Self> {
        if self.status == "success" {
            Ok(self)
        } else {
            Err(StorageError::rejected(
                self.message.unwrap_or_else(|| format!("status '{}'", self.status)),
            ))
        }
    }
}

/// Job transport backed by the storage web app.
#[derive(Clone)]
pub struct AppsScriptClient {
    http: Client,
    url: String,
}

impl AppsScriptClient {
    pub fn new(config: AppsScriptConfig) -> StorageResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(StorageError::Network)?;

        Ok(Self {
            http,
            url: config.url,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Self::new(AppsScriptConfig::from_env()?)
    }

    async fn checked(response: Response) -> StorageResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Http {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl JobTransport for AppsScriptClient {
    async fn upload(&self, payload: &JobPayload) -> StorageResult<JobId> {
        debug!(
            reference = %payload.metadata.reference,
            assets = payload.assets.len(),
            replace = payload.is_replacement(),
            "Uploading job"
        );

        // The web app only accepts simple text bodies.
        let body = serde_json::to_string(payload)?;
        let response = self
            .http
            .post(&self.url)
            .query(&[("action", "generate_job")])
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body)
            .send()
            .await?;

        let reply: TransportResponse = Self::checked(response).await?.json().await?;
        let job_id = reply
            .into_success()?
            .job_id
            .filter(|id| !id.is_empty())
            .map(JobId::from)
            .ok_or(StorageError::MissingJobId)?;

        info!(job_id = %job_id, "Job uploaded");
        Ok(job_id)
    }

    async fn list(&self) -> StorageResult<Vec<JobSummary>> {
        let response = self
            .http
            .get(&self.url)
            .query(&[("action", "list_jobs")])
            .send()
            .await?;

        let reply: TransportResponse = Self::checked(response).await?.json().await?;
        let jobs = reply.into_success()?.jobs.unwrap_or_default();

        debug!(count = jobs.len(), "Listed jobs");
        Ok(jobs)
    }

    async fn fetch(&self, id: &JobId) -> StorageResult<JobPayload> {
        let response = self
            .http
            .get(&self.url)
            .query(&[("action", "get_job"), ("job_id", id.as_str())])
            .send()
            .await?;

        let value: serde_json::Value = Self::checked(response).await?.json().await?;

        // A stored job comes back bare; failures use the envelope.
        if value.get("status").and_then(|s| s.as_str()) == Some("error") {
            let reply: TransportResponse = serde_json::from_value(value)?;
            return Err(StorageError::rejected(
                reply.message.unwrap_or_else(|| format!("job {} not found", id)),
            ));
        }

        let payload: JobPayload = serde_json::from_value(value)?;
        debug!(job_id = %id, assets = payload.assets.len(), "Fetched job");
        Ok(payload)
    }
}

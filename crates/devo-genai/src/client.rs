//! Generative backend HTTP client.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{GenAiError, GenAiResult};
use crate::types::{GenerateContentRequest, GenerateContentResponse};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for the generative backend client.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Base URL of the API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries for transient failures
    pub max_retries: u32,
    /// First retry delay, doubled on every attempt
    pub retry_backoff: Duration,
    /// Model for scripts and reading search
    pub text_model: String,
    pub speech_model: String,
    pub image_model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
            text_model: "gemini-2.5-flash".to_string(),
            speech_model: "gemini-2.5-flash-preview-tts".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
        }
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("text_model", &self.text_model)
            .field("speech_model", &self.speech_model)
            .field("image_model", &self.image_model)
            .finish_non_exhaustive()
    }
}

impl GeminiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            timeout: Duration::from_secs(
                std::env::var("GENAI_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            max_retries: std::env::var("GENAI_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
            ..defaults
        }
    }
}

/// Client for the `generateContent` endpoint.
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new client. Fails when no API key is configured.
    pub fn new(config: GeminiConfig) -> GenAiResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(GenAiError::MissingApiKey);
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GenAiError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> GenAiResult<Self> {
        Self::new(GeminiConfig::from_env())
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Call `models/{model}:generateContent`.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> GenAiResult<GenerateContentResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        );

        debug!(model = %model, "Sending generateContent request");

        self.with_retry(model, || async {
            let response = self
                .http
                .post(&url)
                .query(&[("key", self.config.api_key.as_str())])
                .json(request)
                .send()
                .await
                .map_err(GenAiError::Network)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GenAiError::from_response(status.as_u16(), &body));
            }

            let body = response
                .json::<GenerateContentResponse>()
                .await
                .map_err(GenAiError::Network)?;
            Ok::<_, GenAiError>(body)
        })
        .await
    }

    /// Execute with retry logic. Quota errors are returned immediately.
    async fn with_retry<F, Fut, T>(&self, model: &str, operation: F) -> GenAiResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = GenAiResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.retry_backoff * 2u32.pow(attempt);
                    warn!(
                        model = %model,
                        attempt = attempt + 1,
                        "Generative request failed, retrying in {:?}: {}",
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| GenAiError::invalid_response("retries exhausted")))
    }
}

//! Daily liturgy API client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use devo_models::ReadingCategory;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{SourceError, SourceResult};
use crate::provider::{SourceText, SourceTextProvider};
use crate::reading::clean_reading_text;

const DEFAULT_BASE_URL: &str = "https://api-liturgia-diaria.vercel.app";
const DEFAULT_TITLE: &str = "Liturgia Diária";
const DEFAULT_GOSPEL_REFERENCE: &str = "Evangelho do Dia";

/// Configuration for the liturgy API client.
#[derive(Debug, Clone)]
pub struct LiturgyApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for LiturgyApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl LiturgyApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("LITURGY_API_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct LiturgyResponse {
    #[serde(default)]
    today: Option<LiturgyDay>,
}

#[derive(Debug, Default, Deserialize)]
struct LiturgyDay {
    #[serde(default)]
    entry_title: Option<String>,
    #[serde(default)]
    readings: Option<Readings>,
}

#[derive(Debug, Default, Deserialize)]
struct Readings {
    #[serde(default)]
    gospel: Option<Reading>,
    #[serde(default)]
    first_reading: Option<Reading>,
    #[serde(default)]
    second_reading: Option<Reading>,
    #[serde(default)]
    psalm: Option<Reading>,
}

impl Readings {
    fn take(self, category: ReadingCategory) -> Option<Reading> {
        match category {
            ReadingCategory::Gospel => self.gospel,
            ReadingCategory::FirstReading => self.first_reading,
            ReadingCategory::SecondReading => self.second_reading,
            ReadingCategory::Psalm => self.psalm,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Reading {
    #[serde(default)]
    referencia: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Primary provider backed by the public daily liturgy API.
pub struct LiturgyApiClient {
    http: Client,
    config: LiturgyApiConfig,
}

impl LiturgyApiClient {
    pub fn new(config: LiturgyApiConfig) -> SourceResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SourceError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> SourceResult<Self> {
        Self::new(LiturgyApiConfig::from_env())
    }
}

#[async_trait]
impl SourceTextProvider for LiturgyApiClient {
    fn name(&self) -> &'static str {
        "liturgy_api"
    }

    async fn fetch(&self, date: NaiveDate, category: ReadingCategory) -> SourceResult<SourceText> {
        let url = format!("{}/", self.config.base_url.trim_end_matches('/'));
        let date_param = date.format("%Y-%m-%d").to_string();

        debug!(url = %url, date = %date_param, "Fetching liturgy");

        let response = self
            .http
            .get(&url)
            .query(&[("date", date_param.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Http { status, body });
        }

        let body: LiturgyResponse = response.json().await?;
        let today = body.today.unwrap_or_default();
        let liturgical_title = today
            .entry_title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let reading = today
            .readings
            .unwrap_or_default()
            .take(category)
            .unwrap_or_default();

        let text = clean_reading_text(reading.text.as_deref().unwrap_or_default());
        if text.is_empty() {
            return Err(SourceError::MissingReading(category.to_string()));
        }

        let reference = reading
            .referencia
            .or(reading.title)
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| match category {
                ReadingCategory::Gospel => DEFAULT_GOSPEL_REFERENCE.to_string(),
                _ => String::new(),
            });

        info!(date = %date_param, reference = %reference, "Fetched liturgy from API");

        Ok(SourceText {
            reference,
            text,
            liturgical_title,
        })
    }
}

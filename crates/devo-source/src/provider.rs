//! Source text provider seam and the primary/fallback chain.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use devo_models::ReadingCategory;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{SourceError, SourceResult};

/// One reading of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceText {
    /// Bible reference, e.g. `Mt 5, 1-12`
    pub reference: String,
    pub text: String,
    /// Liturgical day title, e.g. `Segunda-feira da 3ª Semana do Advento`
    pub liturgical_title: String,
}

/// Supplies the reading for a date and category.
#[async_trait]
pub trait SourceTextProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn fetch(&self, date: NaiveDate, category: ReadingCategory) -> SourceResult<SourceText>;
}

/// Tries the primary provider, then the fallback.
pub struct TieredSource {
    primary: Arc<dyn SourceTextProvider>,
    fallback: Arc<dyn SourceTextProvider>,
}

impl TieredSource {
    pub fn new(primary: Arc<dyn SourceTextProvider>, fallback: Arc<dyn SourceTextProvider>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl SourceTextProvider for TieredSource {
    fn name(&self) -> &'static str {
        "tiered"
    }

    async fn fetch(&self, date: NaiveDate, category: ReadingCategory) -> SourceResult<SourceText> {
        let primary_err = match self.primary.fetch(date, category).await {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };

        warn!(
            provider = self.primary.name(),
            date = %date,
            category = %category,
            error = %primary_err,
            "Primary source failed, trying fallback"
        );

        match self.fallback.fetch(date, category).await {
            Ok(text) => {
                info!(provider = self.fallback.name(), date = %date, "Fallback source succeeded");
                Ok(text)
            }
            Err(fallback_err) => Err(SourceError::Exhausted {
                primary: primary_err.to_string(),
                fallback: fallback_err.to_string(),
            }),
        }
    }
}

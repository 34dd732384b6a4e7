//! Search-grounded reading lookup, used as the fallback source.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use devo_models::ReadingCategory;
use devo_source::{SourceError, SourceResult, SourceText, SourceTextProvider};
use serde::Deserialize;
use tracing::info;

use crate::client::GeminiClient;
use crate::types::{GenerateContentRequest, Tool};

const DEFAULT_TITLE: &str = "Liturgia Diária (Search)";

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    referencia: Option<String>,
    #[serde(default)]
    texto: Option<String>,
    #[serde(default)]
    titulo_liturgico: Option<String>,
}

fn category_label(category: ReadingCategory) -> &'static str {
    match category {
        ReadingCategory::Gospel => "Gospel",
        ReadingCategory::FirstReading => "First Reading",
        ReadingCategory::SecondReading => "Second Reading",
        ReadingCategory::Psalm => "Responsorial Psalm",
    }
}

fn search_prompt(date: NaiveDate, category: ReadingCategory) -> String {
    format!(
        "Find the Catholic Daily Liturgy for date: {}.\n\
         I specifically need the full text and reference for: {}.\n\
         Search on reliable sites like \"Canção Nova\", \"CNBB\", or \"Vatican News\".\n\
         \n\
         IMPORTANT: Return the result strictly as a raw JSON object (no markdown code blocks) with these exact keys:\n\
         - referencia (the bible chapter/verse)\n\
         - texto (the full content of the reading)\n\
         - titulo_liturgico (e.g., \"Monday of the 3rd Week of Advent\")",
        date.format("%Y-%m-%d"),
        category_label(category)
    )
}

/// Remove markdown code fences the model may wrap around JSON.
fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

fn parse_search_result(raw: &str, category: ReadingCategory) -> SourceResult<SourceText> {
    let cleaned = strip_code_fences(raw);
    let result: SearchResult = serde_json::from_str(&cleaned)
        .map_err(|e| SourceError::invalid_response(format!("search JSON: {}", e)))?;

    let text = result.texto.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(SourceError::MissingReading(category.to_string()));
    }

    Ok(SourceText {
        reference: result
            .referencia
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "Reference not found".to_string()),
        text,
        liturgical_title: result
            .titulo_liturgico
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
    })
}

/// Fallback provider asking the text model with search grounding enabled.
pub struct GeminiSearchSource {
    client: Arc<GeminiClient>,
}

impl GeminiSearchSource {
    pub fn new(client: Arc<GeminiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceTextProvider for GeminiSearchSource {
    fn name(&self) -> &'static str {
        "gemini_search"
    }

    async fn fetch(&self, date: NaiveDate, category: ReadingCategory) -> SourceResult<SourceText> {
        info!(date = %date, category = %category, "Searching liturgy with generative fallback");

        // Structured output is not available together with search grounding.
        let request = GenerateContentRequest {
            tools: vec![Tool::google_search()],
            ..GenerateContentRequest::from_text(search_prompt(date, category))
        };

        let response = self
            .client
            .generate_content(&self.client.config().text_model, &request)
            .await
            .map_err(|e| SourceError::provider(e.to_string()))?;

        let raw = response
            .text()
            .ok_or_else(|| SourceError::invalid_response("empty search response"))?;

        parse_search_result(&raw, category)
    }
}

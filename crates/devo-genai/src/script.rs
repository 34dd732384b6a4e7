//! Narrative script generation.

use async_trait::async_trait;
use devo_models::{IntroStyle, Script, ScriptBlock, VisualStyle};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::error::{GenAiError, GenAiResult};
use crate::types::{Content, GenerateContentRequest, GenerationConfig};

/// Reading text is cut to this many characters inside the prompt.
const MAX_CONTEXT_CHARS: usize = 3000;

/// Script blocks written by the model. The reading block only gets an
/// image prompt; its spoken text is built from the source reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedScript {
    pub hook: ScriptBlock,
    pub reading_prompt: String,
    pub reflection: ScriptBlock,
    pub application: ScriptBlock,
    pub prayer: ScriptBlock,
}

impl GeneratedScript {
    /// Combine with the spoken reading text into a full script.
    pub fn into_script(self, reading_text: impl Into<String>) -> Script {
        Script {
            hook: Some(self.hook),
            reading: ScriptBlock::new(reading_text, self.reading_prompt),
            reflection: Some(self.reflection),
            application: Some(self.application),
            prayer: Some(self.prayer),
        }
    }
}

/// Writes the narrative blocks for a reading.
#[async_trait]
pub trait ScriptWriter: Send + Sync {
    async fn write_script(
        &self,
        reference: &str,
        text: &str,
        visual_style: VisualStyle,
        intro_style: IntroStyle,
    ) -> GenAiResult<GeneratedScript>;
}

#[derive(Debug, Default, Deserialize)]
struct SectionResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    prompt: String,
}

impl From<SectionResponse> for ScriptBlock {
    fn from(section: SectionResponse) -> Self {
        ScriptBlock::new(section.text, section.prompt)
    }
}

#[derive(Debug, Deserialize)]
struct ScriptResponse {
    #[serde(default)]
    hook: SectionResponse,
    #[serde(default)]
    reading_prompt: String,
    #[serde(default)]
    reflection: SectionResponse,
    #[serde(default)]
    application: SectionResponse,
    #[serde(default)]
    prayer: SectionResponse,
}

fn system_instruction(
    reference: &str,
    text: &str,
    visual_style: VisualStyle,
    intro_style: IntroStyle,
) -> String {
    let context: String = text.chars().take(MAX_CONTEXT_CHARS).collect();
    format!(
        "You are a professional Christian video editor and scriptwriter for short-form vertical videos.\n\
         \n\
         CONTEXT:\n\
         Reference: {reference}\n\
         Liturgical Text: \"{context}\" (truncated if too long)\n\
         \n\
         STYLE:\n\
         Visuals: {visuals}\n\
         Intro Hook: {hook}\n\
         \n\
         TASK:\n\
         Create a script with these blocks:\n\
         1. hook: Intro/Hook (5-8s)\n\
         2. reading_prompt: an image prompt for the moment the reading is proclaimed (solemn, bible, candles). Only the prompt, no text.\n\
         3. reflection: Reflection/Homily (20-25s)\n\
         4. application: Practical Application (20-25s)\n\
         5. prayer: Closing Prayer (15-20s)\n\
         \n\
         For each block except reading_prompt, provide 'text' (spoken Portuguese) and 'prompt' (English image description).",
        visuals = visual_style.prompt_label(),
        hook = intro_style.prompt_hint(),
    )
}

fn response_schema() -> serde_json::Value {
    let section = json!({
        "type": "OBJECT",
        "properties": {
            "text": { "type": "STRING" },
            "prompt": { "type": "STRING" }
        }
    });
    json!({
        "type": "OBJECT",
        "properties": {
            "hook": section,
            "reading_prompt": { "type": "STRING", "description": "Image prompt for the reading section" },
            "reflection": section,
            "application": section,
            "prayer": section
        },
        "required": ["hook", "reading_prompt", "reflection", "application", "prayer"]
    })
}

#[async_trait]
impl ScriptWriter for GeminiClient {
    async fn write_script(
        &self,
        reference: &str,
        text: &str,
        visual_style: VisualStyle,
        intro_style: IntroStyle,
    ) -> GenAiResult<GeneratedScript> {
        debug!(reference = %reference, visual_style = %visual_style, "Requesting script");

        let request = GenerateContentRequest {
            system_instruction: Some(Content::system_text(system_instruction(
                reference,
                text,
                visual_style,
                intro_style,
            ))),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(response_schema()),
                ..Default::default()
            }),
            ..GenerateContentRequest::from_text(format!("Generate the JSON script for: {}", reference))
        };

        let response = self
            .generate_content(&self.config().text_model, &request)
            .await?;
        let body = response.text().ok_or(GenAiError::NoData("script"))?;
        let parsed: ScriptResponse = serde_json::from_str(&body)
            .map_err(|e| GenAiError::invalid_response(format!("script JSON: {}", e)))?;

        info!(reference = %reference, "Script generated");

        Ok(GeneratedScript {
            hook: parsed.hook.into(),
            reading_prompt: parsed.reading_prompt,
            reflection: parsed.reflection.into(),
            application: parsed.application.into(),
            prayer: parsed.prayer.into(),
        })
    }
}

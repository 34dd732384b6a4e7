//! Speech and image synthesis seams.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use devo_models::{preview, AspectRatio, VisualStyle, VoiceOption};
use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::error::{GenAiError, GenAiResult};
use crate::types::{GenerateContentRequest, GenerationConfig, ImageConfig, SpeechConfig};

/// Turns block text into a speech clip.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns raw 16-bit PCM, mono, 24 kHz.
    async fn synthesize_speech(&self, text: &str, voice: VoiceOption) -> GenAiResult<Vec<u8>>;
}

/// Turns an image prompt into an illustration.
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    async fn synthesize_image(
        &self,
        prompt: &str,
        style: VisualStyle,
        aspect_ratio: AspectRatio,
    ) -> GenAiResult<Vec<u8>>;
}

/// Final prompt sent to the image model.
pub fn image_prompt(prompt: &str, style: VisualStyle) -> String {
    format!(
        "{}. Art Style: {}. High resolution, 8k, detailed, cinematic lighting, masterpiece.",
        prompt,
        style.prompt_label()
    )
}

#[async_trait]
impl SpeechSynthesizer for GeminiClient {
    async fn synthesize_speech(&self, text: &str, voice: VoiceOption) -> GenAiResult<Vec<u8>> {
        debug!(voice = %voice, text = %preview(text, 50), "Requesting speech");

        let request = GenerateContentRequest {
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: Some(SpeechConfig::prebuilt(voice.as_str())),
                ..Default::default()
            }),
            ..GenerateContentRequest::from_text(text)
        };

        let response = self
            .generate_content(&self.config().speech_model, &request)
            .await?;
        let data = response.inline_data().ok_or(GenAiError::NoData("audio"))?;
        let bytes = STANDARD.decode(data.data.as_bytes())?;

        info!(voice = %voice, bytes = bytes.len(), "Speech generated");
        Ok(bytes)
    }
}

#[async_trait]
impl ImageSynthesizer for GeminiClient {
    async fn synthesize_image(
        &self,
        prompt: &str,
        style: VisualStyle,
        aspect_ratio: AspectRatio,
    ) -> GenAiResult<Vec<u8>> {
        debug!(
            style = %style,
            aspect_ratio = %aspect_ratio,
            prompt = %preview(prompt, 50),
            "Requesting image"
        );

        let request = GenerateContentRequest {
            generation_config: Some(GenerationConfig {
                image_config: Some(ImageConfig {
                    aspect_ratio: aspect_ratio.to_string(),
                }),
                ..Default::default()
            }),
            ..GenerateContentRequest::from_text(image_prompt(prompt, style))
        };

        let response = self
            .generate_content(&self.config().image_model, &request)
            .await?;
        let data = response.inline_data().ok_or(GenAiError::NoData("image"))?;
        let bytes = STANDARD.decode(data.data.as_bytes())?;

        info!(style = %style, bytes = bytes.len(), "Image generated");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{test_config, text_body};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_image_prompt_format() {
        assert_eq!(
            image_prompt("A shepherd at dawn", VisualStyle::Watercolor),
            "A shepherd at dawn. Art Style: Watercolor. High resolution, 8k, detailed, cinematic lighting, masterpiece."
        );
    }

    #[tokio::test]
    async fn test_speech_decodes_inline_audio() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash-preview-tts:generateContent"))
            .and(body_partial_json(json!({
                "generationConfig": {
                    "responseModalities": ["AUDIO"],
                    "speechConfig": { "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": "Charon" } } }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [
                    { "inlineData": { "mimeType": "audio/L16;rate=24000", "data": "AAEC" } }
                ]}}]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server)).unwrap();
        let bytes = client
            .synthesize_speech("Glória a vós", VoiceOption::Charon)
            .await
            .unwrap();
        assert_eq!(bytes, vec![0u8, 1, 2]);
    }

    #[tokio::test]
    async fn test_image_sends_aspect_ratio() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash-image:generateContent"))
            .and(body_partial_json(json!({
                "generationConfig": { "imageConfig": { "aspectRatio": "9:16" } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [
                    { "text": "Here is your image" },
                    { "inlineData": { "mimeType": "image/png", "data": "iVBO" } }
                ]}}]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server)).unwrap();
        let bytes = client
            .synthesize_image("candles", VisualStyle::Cinematic, AspectRatio::PORTRAIT)
            .await
            .unwrap();
        assert_eq!(bytes, STANDARD.decode("iVBO").unwrap());
    }

    #[tokio::test]
    async fn test_text_only_response_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_body("refused")))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server)).unwrap();
        let err = client
            .synthesize_image("candles", VisualStyle::Anime, AspectRatio::SQUARE)
            .await
            .unwrap_err();
        assert!(matches!(err, GenAiError::NoData("image")));
    }
}

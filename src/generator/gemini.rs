//! Gemini `generateContent` backend over the REST API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ContentGenerator, TextTask};
use crate::error::PlacardError;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Models and credentials for the remote generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// API key; calls fail with a configuration error when missing.
    pub api_key: Option<String>,
    /// Base URL up to (not including) `/models/...`.
    pub endpoint: String,
    pub markup_model: String,
    pub text_model: String,
    pub image_model: String,
    pub timeout: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            markup_model: "gemini-2.5-pro".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            timeout: Duration::from_secs(180),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

impl GenerateResponse {
    fn parts(&self) -> impl Iterator<Item = &ResponsePart> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|c| c.parts.iter())
    }

    /// Concatenated text of the first candidate.
    fn text(&self) -> Option<String> {
        let text: String = self.parts().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }

    /// First inline image of the first candidate, as a data URL.
    fn image_data_url(&self) -> Option<String> {
        self.parts()
            .find_map(|p| p.inline_data.as_ref())
            .map(|d| format!("data:{};base64,{}", d.mime_type, d.data))
    }
}

/// Content generator backed by Google's Gemini models.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeneratorConfig,
}

impl GeminiClient {
    pub fn new(config: GeneratorConfig) -> Result<Self, PlacardError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("placard/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| PlacardError::Config(format!("HTTP client error: {}", e)))?;
        Ok(Self { http, config })
    }

    fn model_for(&self, task: TextTask) -> &str {
        match task {
            TextTask::Markup => &self.config.markup_model,
            TextTask::Copy | TextTask::ImagePrompt => &self.config.text_model,
        }
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        generation_config: Option<GenerationConfig>,
    ) -> Result<GenerateResponse, PlacardError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| PlacardError::Config("API key not set".to_string()))?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            model
        );
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config,
        };

        tracing::debug!(model, prompt_len = prompt.len(), "calling generateContent");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PlacardError::Remote(format!("Request to {} failed: {}", model, e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PlacardError::Remote(format!(
                "{} returned HTTP {}: {}",
                model,
                status,
                detail.chars().take(300).collect::<String>()
            )));
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| PlacardError::RemoteParse(format!("Malformed response from {}: {}", model, e)))
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn complete_text(&self, task: TextTask, prompt: &str) -> Result<String, PlacardError> {
        let model = self.model_for(task);
        self.generate(model, prompt, None)
            .await?
            .text()
            .ok_or_else(|| PlacardError::RemoteParse(format!("{} returned no text", model)))
    }

    async fn complete_image(&self, prompt: &str) -> Result<String, PlacardError> {
        let config = GenerationConfig {
            response_modalities: vec!["IMAGE"],
        };
        self.generate(&self.config.image_model, prompt, Some(config))
            .await?
            .image_data_url()
            .ok_or_else(|| PlacardError::RemoteParse("No image data found in the response.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "hi" }],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE"],
            }),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["responseModalities"][0], "IMAGE");
    }

    #[test]
    fn test_response_text_and_image() {
        let json = r#"{"candidates":[{"content":{"parts":[
            {"text":"<div>"},{"text":"</div>"},
            {"inlineData":{"mimeType":"image/png","data":"iVBO"}}
        ]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().unwrap(), "<div></div>");
        assert_eq!(response.image_data_url().unwrap(), "data:image/png;base64,iVBO");
    }

    #[test]
    fn test_response_without_candidates() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
        assert!(response.image_data_url().is_none());
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let client = GeminiClient::new(GeneratorConfig::default()).unwrap();
        let err = client.complete_text(TextTask::Copy, "x").await.unwrap_err();
        assert!(matches!(err, PlacardError::Config(_)));
    }

    #[test]
    fn test_model_selection() {
        let client = GeminiClient::new(GeneratorConfig::default()).unwrap();
        assert_eq!(client.model_for(TextTask::Markup), "gemini-2.5-pro");
        assert_eq!(client.model_for(TextTask::ImagePrompt), "gemini-2.5-flash");
    }
}

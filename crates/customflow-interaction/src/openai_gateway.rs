//! OpenAiGateway - Direct REST implementation of the OCR/chat gateway.
//!
//! Talks to any OpenAI-compatible Chat Completions endpoint. OCR sends each
//! image as a base64 data URL; replies send the business system prompt plus
//! the rendered reply prompt. One HTTP call per image or reply, no retries.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use customflow_core::ai::{
    AiGateway, AiParameters, ModelInfo, ParameterUpdate, ReplyOutcome, TokenUsage, Tone,
    join_extracted,
};
use customflow_core::config::AiSettings;
use customflow_core::error::{CustomFlowError, Result};
use customflow_core::image::ocr_mime_type;
use customflow_core::outcome::Partitioned;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::fallback::fallback_reply;
use crate::prompts::{OCR_PROMPT, PromptTemplates, SYSTEM_PROMPT};

const PROVIDER: &str = "OpenAI";
const OCR_TEMPERATURE: f64 = 0.1;
const OCR_MAX_TOKENS: u32 = 500;

/// Gateway implementation that talks to the OpenAI HTTP API.
pub struct OpenAiGateway {
    client: Client,
    settings: AiSettings,
    params: RwLock<AiParameters>,
    templates: PromptTemplates,
}

impl OpenAiGateway {
    /// Creates a gateway from explicit settings.
    ///
    /// The HTTP client carries the configured timeout; the initial sampling
    /// parameters are taken from the settings and clamped.
    pub fn new(settings: AiSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| CustomFlowError::config(format!("Failed to build HTTP client: {e}")))?;

        let mut params = AiParameters::default();
        params.apply(ParameterUpdate {
            temperature: Some(settings.temperature),
            max_tokens: Some(settings.max_tokens),
        });

        if settings.has_api_key() {
            tracing::info!(model = %settings.model, "AI gateway initialized");
        } else {
            tracing::warn!("No AI credential configured; replies use canned fallbacks and OCR is unavailable");
        }

        Ok(Self {
            client,
            settings,
            params: RwLock::new(params),
            templates: PromptTemplates::new()?,
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| CustomFlowError::config("AI API key not configured"))
    }

    fn info_from(&self, params: AiParameters) -> ModelInfo {
        ModelInfo {
            model: self.settings.model.clone(),
            provider: PROVIDER.to_string(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            has_api_key: self.settings.has_api_key(),
            vision_ocr: true,
        }
    }

    async fn image_to_content(path: &Path) -> Result<MessageContent> {
        let bytes = tokio::fs::read(path).await?;
        // OpenAI expects data URLs for base64 images
        let data_url = format!(
            "data:{};base64,{}",
            ocr_mime_type(path),
            BASE64_STANDARD.encode(bytes)
        );
        Ok(MessageContent::ImageUrl {
            image_url: ImageUrl {
                url: data_url,
                detail: Some("high".to_string()),
            },
        })
    }

    async fn extract_one(&self, api_key: &str, path: &Path) -> Result<String> {
        let image = Self::image_to_content(path).await?;
        let request = ChatCompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    MessageContent::Text {
                        text: OCR_PROMPT.to_string(),
                    },
                    image,
                ],
            }],
            temperature: OCR_TEMPERATURE,
            max_tokens: OCR_MAX_TOKENS,
        };

        let (text, usage) = self.send_request(api_key, &request).await?;
        if let Some(usage) = usage {
            tracing::debug!(
                path = %path.display(),
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "OCR request completed"
            );
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(CustomFlowError::upstream(None, "No text extracted from image"));
        }
        Ok(text.to_string())
    }

    async fn send_request(
        &self,
        api_key: &str,
        body: &ChatCompletionRequest,
    ) -> Result<(String, Option<TokenUsage>)> {
        let response = self
            .client
            .post(&self.settings.base_url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| {
                CustomFlowError::upstream(None, format!("AI API request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read AI API error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            CustomFlowError::upstream(None, format!("Failed to parse AI API response: {err}"))
        })?;

        let usage = parsed.usage;
        extract_text_response(parsed).map(|text| (text, usage))
    }
}

#[async_trait]
impl AiGateway for OpenAiGateway {
    async fn extract_text(&self, images: &[PathBuf]) -> Result<String> {
        let api_key = self.api_key()?;
        if images.is_empty() {
            return Err(CustomFlowError::validation("images", "at least one image is required"));
        }

        tracing::info!(count = images.len(), "Starting OCR");
        let results = join_all(images.iter().map(|path| self.extract_one(api_key, path))).await;

        let mut outcome = Partitioned::default();
        for (path, result) in images.iter().zip(results) {
            match result {
                Ok(text) => outcome.push_ok(text),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "OCR failed for image");
                    outcome.push_failed(path.display().to_string(), err.to_string());
                }
            }
        }

        tracing::info!(
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "OCR finished"
        );
        join_extracted(&outcome)
    }

    async fn generate_reply(&self, message: &str, tone: Tone) -> Result<ReplyOutcome> {
        let Ok(api_key) = self.api_key() else {
            return Ok(ReplyOutcome {
                text: fallback_reply(message, tone).to_string(),
                usage: None,
                fallback: true,
            });
        };

        let params = *self.params.read().await;
        let prompt = self.templates.reply_prompt(message, tone)?;
        let request = ChatCompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: vec![MessageContent::Text {
                        text: SYSTEM_PROMPT.to_string(),
                    }],
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: vec![MessageContent::Text { text: prompt }],
                },
            ],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let (text, usage) = self.send_request(api_key, &request).await?;
        Ok(ReplyOutcome {
            text,
            usage,
            fallback: false,
        })
    }

    async fn model_info(&self) -> ModelInfo {
        let params = *self.params.read().await;
        self.info_from(params)
    }

    async fn update_parameters(&self, update: ParameterUpdate) -> ModelInfo {
        let params = {
            let mut params = self.params.write().await;
            params.apply(update);
            *params
        };
        tracing::info!(
            temperature = params.temperature,
            max_tokens = params.max_tokens,
            "AI parameters updated"
        );
        self.info_from(params)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<MessageContent>,
}

enum MessageContent {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

// Tagged by "type" on the wire
impl Serialize for MessageContent {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;

        match self {
            MessageContent::Text { text } => {
                map.serialize_entry("type", "text")?;
                map.serialize_entry("text", text)?;
            }
            MessageContent::ImageUrl { image_url } => {
                map.serialize_entry("type", "image_url")?;
                map.serialize_entry("image_url", image_url)?;
            }
        }

        map.end()
    }
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| CustomFlowError::upstream(None, "AI API returned no content in the response"))
}

fn map_http_error(status: StatusCode, body: String) -> CustomFlowError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);
    CustomFlowError::upstream(Some(status.as_u16()), message)
}

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, info};

use super::types::*;
use crate::config::GeminiConfig;
use crate::recommend::Prompt;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("request timeout")]
    Timeout,
    #[error("upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },
    #[error("empty response from model")]
    EmptyResponse,
    #[error("error parsing response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("error sending request: {0}")]
    Transport(reqwest::Error),
    #[error("API key is not a valid header value")]
    InvalidApiKey,
}

impl From<reqwest::Error> for CompletionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CompletionError::Timeout
        } else {
            CompletionError::Transport(e.without_url())
        }
    }
}

/// A text-generation backend: prompt in, free-form text out.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError>;
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    text_model: String,
    vision_model: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CompletionError::Transport(e.without_url()))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            vision_model: config.vision_model.clone(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, CompletionError> {
        self.http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CompletionError::Transport(e.without_url()))?;
        Ok(self)
    }

    fn model_for(&self, prompt: &Prompt) -> &str {
        if prompt.image.is_some() {
            &self.vision_model
        } else {
            &self.text_model
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl Completer for GeminiClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError> {
        let model = self.model_for(prompt);
        let body = build_request(prompt);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut api_key =
            HeaderValue::from_str(&self.api_key).map_err(|_| CompletionError::InvalidApiKey)?;
        api_key.set_sensitive(true);
        headers.insert("x-goog-api-key", api_key);

        debug!(model = %model, image = prompt.image.is_some(), "generateContent request");

        let response = self
            .http
            .post(self.endpoint(model))
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        info!(model = %model, status = status.as_u16(), body = %text, "generateContent response");

        if !status.is_success() {
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)?;
        parsed
            .first_text()
            .map(|t| t.to_string())
            .ok_or(CompletionError::EmptyResponse)
    }
}

pub fn build_request(prompt: &Prompt) -> GenerateContentRequest {
    let mut parts = vec![Part::text(prompt.text.clone())];

    if let Some(ref image) = prompt.image {
        parts.push(Part::inline(sniff_image_mime(image), STANDARD.encode(image)));
    }

    GenerateContentRequest {
        contents: vec![Content { parts }],
    }
}

/// Guess the MIME type of an image from its leading bytes.
pub fn sniff_image_mime(data: &[u8]) -> &'static str {
    match data {
        [0x89, 0x50, 0x4E, ..] => "image/png",
        [0xFF, 0xD8, ..] => "image/jpeg",
        _ => "image/jpeg",
    }
}

//! Claude advisor implementation over the Anthropic Messages API

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::warn;

use super::{AdviceRequest, AdvisorProvider};
use crate::api::error::ProviderError;

const CLAUDE_API_BASE: &str = "https://api.anthropic.com";
const CLAUDE_API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-opus-20240229";
const PROVIDER_NAME: &str = "claude";

/// Claude-backed advisor for explanations and troubleshooting
pub struct ClaudeAdvisor {
    api_key: String,
    model: String,
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize, Clone)]
struct MessageRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Serialize, Clone)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Serialize, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Serialize, Clone)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: String,
    media_type: String,
    data: String,
}

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: Option<String>,
}

impl ClaudeAdvisor {
    /// Create a new advisor with the given API key and model
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent("foldguide/0.1.0")
            .build()
            .map_err(|e| ProviderError::network(PROVIDER_NAME, e.to_string()))?;

        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            client,
            base_url: CLAUDE_API_BASE.to_string(),
        })
    }

    /// Create advisor from the FOLDGUIDE_CLAUDE_API_KEY environment variable
    pub fn from_env(model: Option<&str>) -> Result<Option<Self>, ProviderError> {
        match env::var("FOLDGUIDE_CLAUDE_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(Some(Self::new(
                key,
                model.unwrap_or(DEFAULT_MODEL),
            )?)),
            _ => Ok(None),
        }
    }

    /// Create advisor with a custom base URL (for testing)
    pub fn new_with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let mut advisor = Self::new(api_key, model)?;
        advisor.base_url = base_url.into();
        Ok(advisor)
    }

    /// Check if the env key is present
    pub fn is_env_configured() -> bool {
        env::var("FOLDGUIDE_CLAUDE_API_KEY")
            .map(|k| !k.is_empty())
            .unwrap_or(false)
    }

    fn retry_strategy() -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(10))
            .with_max_times(3)
    }

    fn build_request(&self, request: &AdviceRequest) -> MessageRequest {
        let mut content = Vec::new();
        if let Some(image) = &request.image {
            content.push(ContentBlock::Image {
                source: ImageSource {
                    source_type: "base64".to_string(),
                    media_type: image.media_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&image.data),
                },
            });
        }
        content.push(ContentBlock::Text {
            text: request.prompt.clone(),
        });

        MessageRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![Message {
                role: "user".to_string(),
                content,
            }],
        }
    }

    async fn send(&self, body: &MessageRequest) -> Result<String, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", CLAUDE_API_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::network(PROVIDER_NAME, e.to_string()))?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => {
                let parsed: MessageResponse = response
                    .json()
                    .await
                    .map_err(|e| ProviderError::invalid_response(PROVIDER_NAME, e.to_string()))?;

                parsed
                    .content
                    .into_iter()
                    .find_map(|block| block.text.filter(|t| !t.is_empty()))
                    .ok_or_else(|| {
                        ProviderError::invalid_response(PROVIDER_NAME, "no text content in reply")
                    })
            }
            401 => Err(ProviderError::unauthorized(PROVIDER_NAME)),
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok());
                Err(ProviderError::rate_limited(PROVIDER_NAME, retry_after))
            }
            code => {
                let body = response.text().await.unwrap_or_default();
                Err(ProviderError::http(PROVIDER_NAME, code, body))
            }
        }
    }
}

#[async_trait]
impl AdvisorProvider for ClaudeAdvisor {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn complete(&self, request: AdviceRequest) -> Result<String, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::not_configured(PROVIDER_NAME));
        }

        let body = self.build_request(&request);
        let op = || async { self.send(&body).await };

        op.retry(Self::retry_strategy())
            .when(ProviderError::is_retryable)
            .notify(|err, dur| {
                warn!("Retrying advisor completion after {:?}: {}", dur, err);
            })
            .await
    }
}

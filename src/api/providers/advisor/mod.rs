//! Advisor provider trait and implementations
//!
//! An advisor turns a prompt (optionally grounded in a photo of the
//! user's work) into free-form advisory text. Prompt construction is the
//! caller's concern; the provider only carries the request.

mod claude;

pub use claude::ClaudeAdvisor;

use async_trait::async_trait;

use crate::api::error::ProviderError;

/// An image attached to an advice request.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    /// MIME type, e.g. "image/jpeg"
    pub media_type: String,
    /// Raw image bytes (encoded by the provider as needed)
    pub data: Vec<u8>,
}

/// A single completion request against an advisor.
#[derive(Debug, Clone)]
pub struct AdviceRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Present for image-grounded troubleshooting requests.
    pub image: Option<ImageAttachment>,
}

impl AdviceRequest {
    /// Text-only request with the given token budget.
    pub fn text(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            temperature: 0.0,
            image: None,
        }
    }

    /// Image-grounded request.
    pub fn with_image(
        prompt: impl Into<String>,
        max_tokens: u32,
        image: ImageAttachment,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            temperature: 0.2,
            image: Some(image),
        }
    }
}

/// Trait for text/vision advice services
#[async_trait]
pub trait AdvisorProvider: Send + Sync {
    /// Get the provider name (e.g., "claude")
    fn name(&self) -> &str;

    /// Check if the provider is configured (has API key)
    fn is_configured(&self) -> bool;

    /// Run a completion and return the advisory text
    async fn complete(&self, request: AdviceRequest) -> Result<String, ProviderError>;
}

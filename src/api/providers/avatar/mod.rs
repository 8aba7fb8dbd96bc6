//! Avatar provider trait and implementations
//!
//! An avatar provider renders a short spoken script into a talking-head
//! video and exposes the avatar/voice catalog of the remote account.
//! Rendering is a submit-then-poll job on the remote side; the trait
//! surfaces it as a single call that blocks until the video URL is ready,
//! the job fails, the polling budget runs out, or the caller cancels.

mod heygen;

pub use heygen::HeyGenRenderer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::error::ProviderError;
use crate::api::providers::CancelToken;

/// An avatar available for rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarInfo {
    pub id: String,
    pub name: String,
    pub thumbnail: String,
}

/// A voice available for rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub id: String,
    pub name: String,
    pub language: String,
}

/// The avatar/voice pair used for a render
#[derive(Debug, Clone)]
pub struct AvatarIdentity {
    pub avatar_id: String,
    /// None falls back to the avatar's default voice
    pub voice_id: Option<String>,
}

/// Trait for talking-avatar video services
#[async_trait]
pub trait AvatarProvider: Send + Sync {
    /// Get the provider name (e.g., "heygen")
    fn name(&self) -> &str;

    /// Check if the provider is configured (has API key)
    fn is_configured(&self) -> bool;

    /// List avatars available to the account
    async fn list_avatars(&self) -> Result<Vec<AvatarInfo>, ProviderError>;

    /// List voices available to the account
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, ProviderError>;

    /// Render a script into a video and return its URL.
    ///
    /// Blocks through the remote job's poll loop; checks `cancel` between
    /// polls and aborts with a cancellation error when signalled.
    async fn render(
        &self,
        script: &str,
        identity: &AvatarIdentity,
        cancel: &CancelToken,
    ) -> Result<String, ProviderError>;
}

//! API client modules for external generation services
//!
//! This module provides:
//! - Provider traits for the text/vision advisor and the avatar renderer
//! - Typed transport errors shared by all provider clients
//! - A cancellation token for long-running render jobs

pub mod error;
pub mod providers;

// Re-export commonly used types from providers
pub use error::ProviderError;
pub use providers::advisor::{AdviceRequest, AdvisorProvider, ClaudeAdvisor, ImageAttachment};
pub use providers::avatar::{
    AvatarIdentity, AvatarInfo, AvatarProvider, HeyGenRenderer, VoiceInfo,
};
pub use providers::CancelToken;

//! Core error taxonomy for the guide service.
//!
//! Navigation boundary conditions (already at first/last step, jump out of
//! range) are reported as booleans by the sequence itself and never surface
//! here. These errors cover loading, enrichment, and upload handling.

use thiserror::Error;

use crate::api::error::ProviderError;

/// Errors surfaced by [`crate::guide::GuideService`] operations.
#[derive(Debug, Error)]
pub enum GuideError {
    /// The instruction source produced zero usable steps.
    #[error("no usable steps in input")]
    EmptyInput,

    /// A step index outside `[0, len)` was requested.
    #[error("step index {index} out of range (sequence has {len} steps)")]
    OutOfRange { index: usize, len: usize },

    /// An enrichment was requested while the sequence is empty.
    #[error("no current step")]
    NoCurrentStep,

    /// The external collaborator is not configured or not authenticated.
    #[error("{provider} is not configured")]
    GeneratorUnavailable { provider: String },

    /// The collaborator was invoked but returned failure or timed out.
    #[error("{provider} generation failed: {reason}")]
    GenerationFailed { provider: String, reason: String },

    /// Generation was aborted through a cancellation token.
    #[error("generation cancelled")]
    Cancelled,

    /// Uploaded asset has a disallowed type or is missing.
    #[error("unsupported upload: {0}")]
    UnsupportedInput(String),
}

impl GuideError {
    /// Build a generation failure for a provider.
    pub fn generation_failed(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        GuideError::GenerationFailed {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Build an unavailable error for a provider.
    pub fn unavailable(provider: impl Into<String>) -> Self {
        GuideError::GeneratorUnavailable {
            provider: provider.into(),
        }
    }
}

impl From<ProviderError> for GuideError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured { provider } => {
                GuideError::GeneratorUnavailable { provider }
            }
            ProviderError::Cancelled { .. } => GuideError::Cancelled,
            other => GuideError::GenerationFailed {
                provider: other.provider_name().to_string(),
                reason: other.to_string(),
            },
        }
    }
}

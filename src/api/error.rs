//! Transport-level error types for external provider clients.

use std::fmt;

/// Errors that can occur when interacting with external generation APIs
#[derive(Debug, Clone)]
pub enum ProviderError {
    /// 401 Unauthorized - key invalid or expired
    Unauthorized { provider: String },
    /// 429 Rate Limited
    RateLimited {
        provider: String,
        retry_after_secs: Option<u64>,
    },
    /// Network or timeout error
    NetworkError { provider: String, message: String },
    /// Other HTTP errors
    HttpError {
        provider: String,
        status: u16,
        message: String,
    },
    /// Provider not configured (no key in environment)
    NotConfigured { provider: String },
    /// Response arrived but did not carry the expected fields
    InvalidResponse { provider: String, message: String },
    /// Remote job reported failure
    JobFailed { provider: String, message: String },
    /// Remote job did not complete within the polling budget
    JobTimeout { provider: String, attempts: u32 },
    /// Caller cancelled the operation
    Cancelled { provider: String },
}

impl ProviderError {
    /// Get the provider name for this error
    pub fn provider_name(&self) -> &str {
        match self {
            ProviderError::Unauthorized { provider }
            | ProviderError::RateLimited { provider, .. }
            | ProviderError::NetworkError { provider, .. }
            | ProviderError::HttpError { provider, .. }
            | ProviderError::NotConfigured { provider }
            | ProviderError::InvalidResponse { provider, .. }
            | ProviderError::JobFailed { provider, .. }
            | ProviderError::JobTimeout { provider, .. }
            | ProviderError::Cancelled { provider } => provider,
        }
    }

    /// Transient failures worth retrying (rate limits, network, 5xx)
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::RateLimited { .. } | ProviderError::NetworkError { .. } => true,
            ProviderError::HttpError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Create an unauthorized error for a provider
    pub fn unauthorized(provider: impl Into<String>) -> Self {
        ProviderError::Unauthorized {
            provider: provider.into(),
        }
    }

    /// Create a rate limited error for a provider
    pub fn rate_limited(provider: impl Into<String>, retry_after: Option<u64>) -> Self {
        ProviderError::RateLimited {
            provider: provider.into(),
            retry_after_secs: retry_after,
        }
    }

    /// Create a network error for a provider
    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::NetworkError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP error for a provider
    pub fn http(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        ProviderError::HttpError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a not configured error for a provider
    pub fn not_configured(provider: impl Into<String>) -> Self {
        ProviderError::NotConfigured {
            provider: provider.into(),
        }
    }

    /// Create an invalid response error for a provider
    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a job failed error for a provider
    pub fn job_failed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::JobFailed {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a job timeout error for a provider
    pub fn job_timeout(provider: impl Into<String>, attempts: u32) -> Self {
        ProviderError::JobTimeout {
            provider: provider.into(),
            attempts,
        }
    }

    /// Create a cancellation error for a provider
    pub fn cancelled(provider: impl Into<String>) -> Self {
        ProviderError::Cancelled {
            provider: provider.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Unauthorized { provider } => {
                write!(f, "{provider}: Unauthorized (401)")
            }
            ProviderError::RateLimited {
                provider,
                retry_after_secs,
            } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "{provider}: Rate limited - retry after {secs}s")
                } else {
                    write!(f, "{provider}: Rate limited")
                }
            }
            ProviderError::NetworkError { provider, message } => {
                write!(f, "{provider}: Network error - {message}")
            }
            ProviderError::HttpError {
                provider,
                status,
                message,
            } => {
                write!(f, "{provider}: HTTP {status} - {message}")
            }
            ProviderError::NotConfigured { provider } => {
                write!(f, "{provider}: Not configured (no API key)")
            }
            ProviderError::InvalidResponse { provider, message } => {
                write!(f, "{provider}: Invalid response - {message}")
            }
            ProviderError::JobFailed { provider, message } => {
                write!(f, "{provider}: Job failed - {message}")
            }
            ProviderError::JobTimeout { provider, attempts } => {
                write!(f, "{provider}: Job not complete after {attempts} polls")
            }
            ProviderError::Cancelled { provider } => {
                write!(f, "{provider}: Cancelled by caller")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

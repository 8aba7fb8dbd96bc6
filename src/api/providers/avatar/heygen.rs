//! HeyGen avatar renderer implementation
//!
//! Submits a video generation job, then polls its status at a fixed
//! delay until it completes, fails, or the attempt budget is spent. The
//! poll is a blocking wait, not a scheduled retry: a timeout fails the
//! render outright.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use super::{AvatarIdentity, AvatarInfo, AvatarProvider, VoiceInfo};
use crate::api::error::ProviderError;
use crate::api::providers::CancelToken;

const HEYGEN_API_BASE: &str = "https://api.heygen.com/v1";
const PROVIDER_NAME: &str = "heygen";

/// Default delay between status polls
const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(5);
/// Default number of status polls before giving up
const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// HeyGen API client for avatar video rendering
pub struct HeyGenRenderer {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    poll_delay: Duration,
    max_attempts: u32,
}

#[derive(Serialize)]
struct SubmitRequest {
    background: String,
    clips: Vec<Clip>,
    ratio: String,
    test: bool,
    version: String,
}

#[derive(Serialize)]
struct Clip {
    avatar_id: String,
    avatar_style: String,
    input_text: String,
    voice_id: Option<String>,
    voice_settings: VoiceSettings,
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity: f32,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    data: Option<SubmitData>,
}

#[derive(Deserialize)]
struct SubmitData {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(default)]
    data: Option<StatusData>,
}

#[derive(Deserialize)]
struct StatusData {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    video_url: Option<String>,
}

#[derive(Deserialize)]
struct AvatarListResponse {
    #[serde(default)]
    data: Option<AvatarListData>,
}

#[derive(Deserialize, Default)]
struct AvatarListData {
    #[serde(default)]
    avatars: Vec<RemoteAvatar>,
}

#[derive(Deserialize)]
struct RemoteAvatar {
    avatar_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    portrait_url: Option<String>,
}

#[derive(Deserialize)]
struct VoiceListResponse {
    #[serde(default)]
    data: Option<VoiceListData>,
}

#[derive(Deserialize, Default)]
struct VoiceListData {
    #[serde(default)]
    voices: Vec<RemoteVoice>,
}

#[derive(Deserialize)]
struct RemoteVoice {
    voice_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

/// Outcome of one status poll
enum PollOutcome {
    Completed(String),
    Failed,
    InProgress(String),
}

impl HeyGenRenderer {
    /// Create a new renderer with the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent("foldguide/0.1.0")
            .build()
            .map_err(|e| ProviderError::network(PROVIDER_NAME, e.to_string()))?;

        Ok(Self {
            api_key: api_key.into(),
            client,
            base_url: HEYGEN_API_BASE.to_string(),
            poll_delay: DEFAULT_POLL_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    /// Create renderer from the FOLDGUIDE_HEYGEN_API_KEY environment variable
    pub fn from_env() -> Result<Option<Self>, ProviderError> {
        match env::var("FOLDGUIDE_HEYGEN_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(Some(Self::new(key)?)),
            _ => Ok(None),
        }
    }

    /// Check if the env key is present
    pub fn is_env_configured() -> bool {
        env::var("FOLDGUIDE_HEYGEN_API_KEY")
            .map(|k| !k.is_empty())
            .unwrap_or(false)
    }

    /// Create renderer with a custom base URL (for testing)
    pub fn new_with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let mut renderer = Self::new(api_key)?;
        renderer.base_url = base_url.into();
        Ok(renderer)
    }

    /// Override the polling cadence (delay between polls, attempt budget)
    pub fn with_poll_config(mut self, poll_delay: Duration, max_attempts: u32) -> Self {
        self.poll_delay = poll_delay;
        self.max_attempts = max_attempts;
        self
    }

    async fn submit(
        &self,
        script: &str,
        identity: &AvatarIdentity,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/video.generate", self.base_url);
        let body = SubmitRequest {
            background: "#ffffff".to_string(),
            clips: vec![Clip {
                avatar_id: identity.avatar_id.clone(),
                avatar_style: "normal".to_string(),
                input_text: script.to_string(),
                voice_id: identity.voice_id.clone(),
                voice_settings: VoiceSettings {
                    stability: 0.5,
                    similarity: 0.75,
                },
            }],
            ratio: "16:9".to_string(),
            test: false,
            version: "v1".to_string(),
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::network(PROVIDER_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_http_error(status.as_u16(), body));
        }

        let parsed: SubmitResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(PROVIDER_NAME, e.to_string()))?;

        parsed
            .data
            .and_then(|d| d.video_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ProviderError::invalid_response(PROVIDER_NAME, "no video id returned"))
    }

    async fn poll_status(&self, video_id: &str) -> Result<PollOutcome, ProviderError> {
        let url = format!("{}/video.status", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .query(&[("video_id", video_id)])
            .send()
            .await
            .map_err(|e| ProviderError::network(PROVIDER_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_http_error(status.as_u16(), body));
        }

        let parsed: StatusResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(PROVIDER_NAME, e.to_string()))?;

        let data = parsed
            .data
            .ok_or_else(|| ProviderError::invalid_response(PROVIDER_NAME, "missing status data"))?;

        match data.status.as_deref() {
            Some("completed") => {
                let video_url = data.video_url.filter(|u| !u.is_empty()).ok_or_else(|| {
                    ProviderError::invalid_response(PROVIDER_NAME, "completed without video url")
                })?;
                Ok(PollOutcome::Completed(video_url))
            }
            Some("failed") => Ok(PollOutcome::Failed),
            Some(other) => Ok(PollOutcome::InProgress(other.to_string())),
            None => Err(ProviderError::invalid_response(
                PROVIDER_NAME,
                "missing job status",
            )),
        }
    }

    fn map_http_error(status: u16, body: String) -> ProviderError {
        match status {
            401 => ProviderError::unauthorized(PROVIDER_NAME),
            429 => ProviderError::rate_limited(PROVIDER_NAME, None),
            code => ProviderError::http(PROVIDER_NAME, code, body),
        }
    }
}

#[async_trait]
impl AvatarProvider for HeyGenRenderer {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn list_avatars(&self) -> Result<Vec<AvatarInfo>, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::not_configured(PROVIDER_NAME));
        }

        let url = format!("{}/avatar.list", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::network(PROVIDER_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_http_error(status.as_u16(), body));
        }

        let parsed: AvatarListResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(PROVIDER_NAME, e.to_string()))?;

        Ok(parsed
            .data
            .unwrap_or_default()
            .avatars
            .into_iter()
            .map(|a| AvatarInfo {
                id: a.avatar_id,
                name: a.name.unwrap_or_else(|| "Unknown".to_string()),
                thumbnail: a.portrait_url.unwrap_or_default(),
            })
            .collect())
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::not_configured(PROVIDER_NAME));
        }

        let url = format!("{}/voice.list", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::network(PROVIDER_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_http_error(status.as_u16(), body));
        }

        let parsed: VoiceListResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(PROVIDER_NAME, e.to_string()))?;

        Ok(parsed
            .data
            .unwrap_or_default()
            .voices
            .into_iter()
            .map(|v| VoiceInfo {
                id: v.voice_id,
                name: v.name.unwrap_or_else(|| "Unknown".to_string()),
                language: v.language.unwrap_or_else(|| "Unknown".to_string()),
            })
            .collect())
    }

    async fn render(
        &self,
        script: &str,
        identity: &AvatarIdentity,
        cancel: &CancelToken,
    ) -> Result<String, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::not_configured(PROVIDER_NAME));
        }

        let video_id = self.submit(script, identity).await?;
        tracing::info!(video_id = %video_id, "render job submitted");

        for attempt in 1..=self.max_attempts {
            if cancel.is_cancelled() {
                tracing::info!(video_id = %video_id, "render cancelled");
                return Err(ProviderError::cancelled(PROVIDER_NAME));
            }

            match self.poll_status(&video_id).await? {
                PollOutcome::Completed(url) => {
                    tracing::info!(video_id = %video_id, "render complete");
                    return Ok(url);
                }
                PollOutcome::Failed => {
                    return Err(ProviderError::job_failed(
                        PROVIDER_NAME,
                        format!("video {video_id} failed"),
                    ));
                }
                PollOutcome::InProgress(state) => {
                    tracing::debug!(
                        video_id = %video_id,
                        state = %state,
                        attempt,
                        max_attempts = self.max_attempts,
                        "render in progress"
                    );
                }
            }

            tokio::select! {
                () = tokio::time::sleep(self.poll_delay) => {}
                () = cancel.cancelled() => {
                    tracing::info!(video_id = %video_id, "render cancelled during wait");
                    return Err(ProviderError::cancelled(PROVIDER_NAME));
                }
            }
        }

        Err(ProviderError::job_timeout(PROVIDER_NAME, self.max_attempts))
    }
}

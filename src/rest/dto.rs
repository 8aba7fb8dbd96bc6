//! Request/response bodies for the REST API.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::{AvatarInfo, VoiceInfo};
use crate::guide::{NavOutcome, StepView};

/// Body for loading a new instruction sequence.
///
/// Raw text wins when both fields are present; with neither, the
/// `basic_crane` preset is used.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoadRequest {
    /// Raw instruction text, one step per line
    #[serde(default)]
    pub text: Option<String>,
    /// Name of a built-in preset
    #[serde(default)]
    pub preset: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoadResponse {
    pub total_steps: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StepResponse {
    pub index: usize,
    pub total: usize,
    pub text: String,
}

impl From<StepView> for StepResponse {
    fn from(view: StepView) -> Self {
        Self {
            index: view.index,
            total: view.total,
            text: view.text,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NavResponse {
    /// Whether the cursor moved; false at a sequence boundary
    pub moved: bool,
    pub step: Option<StepResponse>,
}

impl From<NavOutcome> for NavResponse {
    fn from(outcome: NavOutcome) -> Self {
        Self {
            moved: outcome.moved,
            step: outcome.step.map(StepResponse::from),
        }
    }
}

/// Query flag shared by enrichment endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ForceQuery {
    /// Regenerate even when a cached artifact exists
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdviceResponse {
    pub advice: String,
    /// Whether the advice was served from the cache
    pub cached: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImageAdviceResponse {
    pub advice: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub video_url: String,
    /// Whether the video was served from the cache
    pub cached: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct HelpVideoRequest {
    /// Step text the user is stuck on; defaults to the current step
    #[serde(default)]
    pub step_text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvatarResponse {
    pub id: String,
    pub name: String,
    pub thumbnail: String,
}

impl From<AvatarInfo> for AvatarResponse {
    fn from(info: AvatarInfo) -> Self {
        Self {
            id: info.id,
            name: info.name,
            thumbnail: info.thumbnail,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VoiceResponse {
    pub id: String,
    pub name: String,
    pub language: String,
}

impl From<VoiceInfo> for VoiceResponse {
    fn from(info: VoiceInfo) -> Self {
        Self {
            id: info.id,
            name: info.name,
            language: info.language,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectionRequest {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SelectionResponse {
    /// Whether the id was recognized and applied
    pub applied: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub advisor_configured: bool,
    pub renderer_configured: bool,
    pub renderer_ready: bool,
    pub total_steps: usize,
}

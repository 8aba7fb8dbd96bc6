//! OpenAPI specification builder using utoipa.

use utoipa::OpenApi;

use crate::rest::dto::{
    AdviceResponse, AvatarResponse, HealthResponse, HelpVideoRequest, ImageAdviceResponse,
    LoadRequest, LoadResponse, NavResponse, SelectionRequest, SelectionResponse, StatusResponse,
    StepResponse, VideoResponse, VoiceResponse,
};
use crate::rest::error::ErrorResponse;

/// OpenAPI documentation for the FoldGuide REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FoldGuide API",
        version = "0.1.0",
        description = "REST API for the step-by-step origami instruction guide.",
        license(name = "MIT")
    ),
    paths(
        // Health endpoints
        crate::rest::routes::health::health,
        crate::rest::routes::health::status,
        // Sequence endpoints
        crate::rest::routes::guide::load,
        crate::rest::routes::guide::current,
        crate::rest::routes::guide::next,
        crate::rest::routes::guide::previous,
        crate::rest::routes::guide::jump,
        // Advisory endpoints
        crate::rest::routes::enrich::explain,
        crate::rest::routes::enrich::troubleshoot,
        crate::rest::routes::enrich::troubleshoot_image,
        // Video endpoints
        crate::rest::routes::videos::welcome,
        crate::rest::routes::videos::step,
        crate::rest::routes::videos::help,
        // Avatar catalog endpoints
        crate::rest::routes::avatars::list_avatars,
        crate::rest::routes::avatars::list_voices,
        crate::rest::routes::avatars::select_avatar,
        crate::rest::routes::avatars::select_voice,
    ),
    components(
        schemas(
            // Response types
            HealthResponse,
            StatusResponse,
            LoadResponse,
            StepResponse,
            NavResponse,
            AdviceResponse,
            ImageAdviceResponse,
            VideoResponse,
            AvatarResponse,
            VoiceResponse,
            SelectionResponse,
            ErrorResponse,
            // Request types
            LoadRequest,
            HelpVideoRequest,
            SelectionRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check and status endpoints"),
        (name = "Guide", description = "Sequence loading and navigation"),
        (name = "Enrichment", description = "Advisory text generation"),
        (name = "Videos", description = "Avatar video generation"),
        (name = "Avatars", description = "Avatar and voice catalog management"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI specification as a JSON string
    pub fn json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}

//! Avatar video endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::api::CancelToken;
use crate::guide::EnrichmentKind;
use crate::rest::dto::{ForceQuery, HelpVideoRequest, VideoResponse};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;

/// Get the welcome video
#[utoipa::path(
    get,
    path = "/api/v1/videos/welcome",
    tag = "Videos",
    params(ForceQuery),
    responses(
        (status = 200, description = "Welcome video", body = VideoResponse),
        (status = 502, description = "Render failed", body = ErrorResponse),
        (status = 503, description = "Renderer not configured", body = ErrorResponse)
    )
)]
pub async fn welcome(
    State(state): State<ApiState>,
    Query(query): Query<ForceQuery>,
) -> Result<Json<VideoResponse>, ApiError> {
    video(&state, EnrichmentKind::WelcomeVideo, query.force).await
}

/// Get the avatar video for a step
#[utoipa::path(
    get,
    path = "/api/v1/videos/step/{index}",
    tag = "Videos",
    params(
        ("index" = usize, Path, description = "Zero-based step index"),
        ForceQuery
    ),
    responses(
        (status = 200, description = "Step video", body = VideoResponse),
        (status = 404, description = "Step index out of range", body = ErrorResponse),
        (status = 502, description = "Render failed", body = ErrorResponse),
        (status = 503, description = "Renderer not configured", body = ErrorResponse)
    )
)]
pub async fn step(
    State(state): State<ApiState>,
    Path(index): Path<usize>,
    Query(query): Query<ForceQuery>,
) -> Result<Json<VideoResponse>, ApiError> {
    video(&state, EnrichmentKind::StepVideo { index }, query.force).await
}

/// Get a help video for a step the user is stuck on
#[utoipa::path(
    post,
    path = "/api/v1/videos/help",
    tag = "Videos",
    params(ForceQuery),
    request_body = HelpVideoRequest,
    responses(
        (status = 200, description = "Help video", body = VideoResponse),
        (status = 404, description = "No current step and no step text given", body = ErrorResponse),
        (status = 502, description = "Render failed", body = ErrorResponse),
        (status = 503, description = "Renderer not configured", body = ErrorResponse)
    )
)]
pub async fn help(
    State(state): State<ApiState>,
    Query(query): Query<ForceQuery>,
    Json(request): Json<HelpVideoRequest>,
) -> Result<Json<VideoResponse>, ApiError> {
    video(
        &state,
        EnrichmentKind::HelpVideo {
            step_text: request.step_text,
        },
        query.force,
    )
    .await
}

async fn video(
    state: &ApiState,
    kind: EnrichmentKind,
    force: bool,
) -> Result<Json<VideoResponse>, ApiError> {
    let cancel = CancelToken::new();
    let lookup = state.service.enrich(kind, force, &cancel).await?;
    let video_url = lookup
        .artifact
        .as_video_url()
        .ok_or_else(|| ApiError::InternalError("unexpected artifact type".to_string()))?
        .to_string();

    Ok(Json(VideoResponse {
        video_url,
        cached: lookup.was_cached,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::guide::GuideService;
    use std::sync::Arc;

    fn make_state() -> ApiState {
        let config = Config::default();
        ApiState::new(Arc::new(GuideService::new(&config, None, None)))
    }

    #[tokio::test]
    async fn test_welcome_without_renderer_is_unavailable() {
        let result = welcome(State(make_state()), Query(ForceQuery::default())).await;
        assert!(matches!(result, Err(ApiError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_step_video_without_sequence_is_not_found() {
        let result = step(State(make_state()), Path(0), Query(ForceQuery::default())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}

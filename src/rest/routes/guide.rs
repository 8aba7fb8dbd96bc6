//! Sequence loading and navigation endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::guide::InstructionSource;
use crate::rest::dto::{LoadRequest, LoadResponse, NavResponse, StepResponse};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;

/// Preset used when a load request names nothing.
const DEFAULT_PRESET: &str = "basic_crane";

/// Load a new instruction sequence
#[utoipa::path(
    post,
    path = "/api/v1/guide/load",
    tag = "Guide",
    request_body = LoadRequest,
    responses(
        (status = 200, description = "Sequence loaded", body = LoadResponse),
        (status = 400, description = "No usable steps in input", body = ErrorResponse)
    )
)]
pub async fn load(
    State(state): State<ApiState>,
    Json(request): Json<LoadRequest>,
) -> Result<Json<LoadResponse>, ApiError> {
    let source = match request.text.filter(|t| !t.trim().is_empty()) {
        Some(text) => InstructionSource::RawText(text),
        None => InstructionSource::Preset(
            request
                .preset
                .unwrap_or_else(|| DEFAULT_PRESET.to_string()),
        ),
    };

    let total_steps = state.service.load(&source).await?;
    Ok(Json(LoadResponse { total_steps }))
}

/// Get the current step
#[utoipa::path(
    get,
    path = "/api/v1/guide/step",
    tag = "Guide",
    responses(
        (status = 200, description = "The step under the cursor", body = StepResponse),
        (status = 404, description = "No sequence loaded", body = ErrorResponse)
    )
)]
pub async fn current(State(state): State<ApiState>) -> Result<Json<StepResponse>, ApiError> {
    state
        .service
        .current_step()
        .await
        .map(StepResponse::from)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no current step".to_string()))
}

/// Move to the next step
#[utoipa::path(
    post,
    path = "/api/v1/guide/next",
    tag = "Guide",
    responses(
        (status = 200, description = "Navigation outcome; moved=false at the last step", body = NavResponse)
    )
)]
pub async fn next(State(state): State<ApiState>) -> Json<NavResponse> {
    Json(state.service.advance().await.into())
}

/// Move to the previous step
#[utoipa::path(
    post,
    path = "/api/v1/guide/previous",
    tag = "Guide",
    responses(
        (status = 200, description = "Navigation outcome; moved=false at the first step", body = NavResponse)
    )
)]
pub async fn previous(State(state): State<ApiState>) -> Json<NavResponse> {
    Json(state.service.retreat().await.into())
}

/// Jump to a step by index
#[utoipa::path(
    post,
    path = "/api/v1/guide/jump/{index}",
    tag = "Guide",
    params(
        ("index" = usize, Path, description = "Zero-based step index")
    ),
    responses(
        (status = 200, description = "Navigation outcome; moved=false for out-of-range indices", body = NavResponse)
    )
)]
pub async fn jump(State(state): State<ApiState>, Path(index): Path<usize>) -> Json<NavResponse> {
    Json(state.service.jump(index).await.into())
}

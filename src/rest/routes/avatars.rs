//! Avatar and voice catalog endpoints.

use axum::{extract::State, Json};

use crate::rest::dto::{AvatarResponse, SelectionRequest, SelectionResponse, VoiceResponse};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;

/// List avatars available for rendering
#[utoipa::path(
    get,
    path = "/api/v1/avatars",
    tag = "Avatars",
    responses(
        (status = 200, description = "Available avatars", body = Vec<AvatarResponse>),
        (status = 502, description = "Catalog fetch failed", body = ErrorResponse),
        (status = 503, description = "Renderer not configured", body = ErrorResponse)
    )
)]
pub async fn list_avatars(
    State(state): State<ApiState>,
) -> Result<Json<Vec<AvatarResponse>>, ApiError> {
    let avatars = state.service.avatars().await?;
    Ok(Json(avatars.into_iter().map(AvatarResponse::from).collect()))
}

/// List voices available for rendering
#[utoipa::path(
    get,
    path = "/api/v1/voices",
    tag = "Avatars",
    responses(
        (status = 200, description = "Available voices", body = Vec<VoiceResponse>),
        (status = 502, description = "Catalog fetch failed", body = ErrorResponse),
        (status = 503, description = "Renderer not configured", body = ErrorResponse)
    )
)]
pub async fn list_voices(
    State(state): State<ApiState>,
) -> Result<Json<Vec<VoiceResponse>>, ApiError> {
    let voices = state.service.voices().await?;
    Ok(Json(voices.into_iter().map(VoiceResponse::from).collect()))
}

/// Select the avatar used for future renders
#[utoipa::path(
    put,
    path = "/api/v1/avatars/selection",
    tag = "Avatars",
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Selection outcome; applied=false for unknown ids", body = SelectionResponse),
        (status = 503, description = "Renderer not configured", body = ErrorResponse)
    )
)]
pub async fn select_avatar(
    State(state): State<ApiState>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<SelectionResponse>, ApiError> {
    let applied = state.service.set_avatar(&request.id).await?;
    Ok(Json(SelectionResponse { applied }))
}

/// Select the voice used for future renders
#[utoipa::path(
    put,
    path = "/api/v1/voices/selection",
    tag = "Avatars",
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Selection outcome; applied=false for unknown ids", body = SelectionResponse),
        (status = 503, description = "Renderer not configured", body = ErrorResponse)
    )
)]
pub async fn select_voice(
    State(state): State<ApiState>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<SelectionResponse>, ApiError> {
    let applied = state.service.set_voice(&request.id).await?;
    Ok(Json(SelectionResponse { applied }))
}

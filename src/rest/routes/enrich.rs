//! Advisory text endpoints: explanation and troubleshooting.

use axum::{
    extract::{Multipart, Query, State},
    Json,
};

use crate::api::CancelToken;
use crate::guide::EnrichmentKind;
use crate::rest::dto::{AdviceResponse, ForceQuery, ImageAdviceResponse};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;

/// Get a detailed explanation of the current step
#[utoipa::path(
    get,
    path = "/api/v1/guide/explain",
    tag = "Enrichment",
    params(ForceQuery),
    responses(
        (status = 200, description = "Explanation text", body = AdviceResponse),
        (status = 404, description = "No current step", body = ErrorResponse),
        (status = 502, description = "Generation failed", body = ErrorResponse),
        (status = 503, description = "Advisor not configured", body = ErrorResponse)
    )
)]
pub async fn explain(
    State(state): State<ApiState>,
    Query(query): Query<ForceQuery>,
) -> Result<Json<AdviceResponse>, ApiError> {
    advice(&state, EnrichmentKind::Explain, query.force).await
}

/// Get troubleshooting advice for the current step
#[utoipa::path(
    get,
    path = "/api/v1/guide/troubleshoot",
    tag = "Enrichment",
    params(ForceQuery),
    responses(
        (status = 200, description = "Troubleshooting text", body = AdviceResponse),
        (status = 404, description = "No current step", body = ErrorResponse),
        (status = 502, description = "Generation failed", body = ErrorResponse),
        (status = 503, description = "Advisor not configured", body = ErrorResponse)
    )
)]
pub async fn troubleshoot(
    State(state): State<ApiState>,
    Query(query): Query<ForceQuery>,
) -> Result<Json<AdviceResponse>, ApiError> {
    advice(&state, EnrichmentKind::Troubleshoot, query.force).await
}

async fn advice(
    state: &ApiState,
    kind: EnrichmentKind,
    force: bool,
) -> Result<Json<AdviceResponse>, ApiError> {
    let cancel = CancelToken::new();
    let lookup = state.service.enrich(kind, force, &cancel).await?;
    let advice = lookup
        .artifact
        .as_text()
        .ok_or_else(|| ApiError::InternalError("unexpected artifact type".to_string()))?
        .to_string();

    Ok(Json(AdviceResponse {
        advice,
        cached: lookup.was_cached,
    }))
}

/// Get troubleshooting advice grounded in a photo of the user's progress
#[utoipa::path(
    post,
    path = "/api/v1/guide/troubleshoot/image",
    tag = "Enrichment",
    responses(
        (status = 200, description = "Image-grounded advice", body = ImageAdviceResponse),
        (status = 400, description = "Missing or unsupported image", body = ErrorResponse),
        (status = 404, description = "No current step", body = ErrorResponse),
        (status = 502, description = "Generation failed", body = ErrorResponse),
        (status = 503, description = "Advisor not configured", body = ErrorResponse)
    )
)]
pub async fn troubleshoot_image(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> Result<Json<ImageAdviceResponse>, ApiError> {
    let mut image: Option<(Vec<u8>, String)> = None;
    let mut description = "I am stuck".to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("image") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("invalid image field: {e}")))?;
                image = Some((data.to_vec(), filename));
            }
            Some("description") => {
                description = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("invalid description field: {e}")))?;
            }
            _ => {}
        }
    }

    let (data, filename) =
        image.ok_or_else(|| ApiError::BadRequest("no image provided".to_string()))?;

    let advice = state
        .service
        .troubleshoot_image(&data, &filename, &description)
        .await?;

    Ok(Json(ImageAdviceResponse { advice }))
}

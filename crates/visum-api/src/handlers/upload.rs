//! Presigned upload handler.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use visum_entity::upload::{PresignedUrlRequest, PresignedUrlResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/get-presigned-url
pub async fn get_presigned_url(
    State(state): State<AppState>,
    body: Result<Json<PresignedUrlRequest>, JsonRejection>,
) -> Result<Json<PresignedUrlResponse>, ApiError> {
    let Json(req) = body?;
    let response = state.upload_service.create_presigned_url(&req).await?;
    Ok(Json(response))
}

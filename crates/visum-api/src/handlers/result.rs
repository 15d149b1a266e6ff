//! Job status poll handler.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};

use visum_core::traits::store::Record;

use crate::dto::request::ResultQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/result?jobId=...
///
/// Returns the stored record as a flat JSON object.
pub async fn get_result(
    State(state): State<AppState>,
    query: Result<Query<ResultQuery>, QueryRejection>,
) -> Result<Json<Record>, ApiError> {
    let Query(query) = query?;
    let job_id = query.job_id.unwrap_or_default();
    let record = state.status_reader.get_result(&job_id).await?;
    Ok(Json(record))
}

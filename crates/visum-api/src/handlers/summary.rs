//! Job submission handler.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;

use visum_core::error::AppError;

use crate::dto::request::{SummaryQuery, SummaryRequest};
use crate::dto::response::SummaryAccepted;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/send-summary-request
///
/// The object key comes from `?file=` when present, otherwise from the
/// JSON body's `object_key`.
pub async fn send_summary_request(
    State(state): State<AppState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
    body: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SummaryAccepted>), ApiError> {
    let Query(query) = query?;
    let object_key = match query.file {
        Some(file) => file,
        None => {
            let Json(req) = body?;
            req.object_key
                .ok_or_else(|| AppError::validation("object_key is required"))?
        }
    };

    let receipt = state.orchestrator.submit(&object_key).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SummaryAccepted {
            message: "Summary request accepted".to_string(),
            job_id: receipt.job_id.to_string(),
            status: receipt.status,
        }),
    ))
}

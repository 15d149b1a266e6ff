//! Route definitions.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers::{health, result, summary, upload};
use crate::state::AppState;

/// Builds the `/api` route tree.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/send-summary-request",
            post(summary::send_summary_request),
        )
        .route("/result", get(result::get_result))
        .route("/get-presigned-url", post(upload::get_presigned_url))
        .route("/health", get(health::health));

    Router::new().nest("/api", api).with_state(state)
}

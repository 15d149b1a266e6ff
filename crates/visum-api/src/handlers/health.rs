//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use visum_core::result::AppResult;

use crate::dto::response::{ComponentHealth, HealthResponse};
use crate::state::AppState;

fn component(provider: &str, check: AppResult<bool>) -> ComponentHealth {
    let (status, error) = match check {
        Ok(true) => ("up", None),
        Ok(false) => ("down", None),
        Err(e) => ("down", Some(e.to_string())),
    };
    ComponentHealth {
        provider: provider.to_string(),
        status: status.to_string(),
        error,
    }
}

/// GET /api/health
///
/// 200 when the store and the dispatch channel both answer, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (store_check, dispatch_check) =
        tokio::join!(state.store.health_check(), state.dispatch.health_check());

    let store = component(state.store.provider_type(), store_check);
    let dispatch = component(state.dispatch.provider_type(), dispatch_check);
    let healthy = store.status == "up" && dispatch.status == "up";

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store,
            dispatch,
        }),
    )
}

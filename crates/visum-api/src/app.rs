//! Application builder: assembles the router and the middleware stack, and
//! serves it.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use visum_core::config::{CorsConfig, ServerConfig};
use visum_core::error::{AppError, ErrorKind};
use visum_core::result::AppResult;

use crate::middleware::compression::build_compression_layer;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the application with every route and middleware attached.
pub fn build_app(state: AppState, cors: &CorsConfig) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds.max(1));

    build_router(state)
        .layer(axum::middleware::from_fn(request_logging))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(build_compression_layer())
        .layer(build_cors_layer(cors))
}

/// Binds `config.host:config.port` and serves `app` until `shutdown`
/// resolves, then drains open connections for at most
/// `config.shutdown_grace_seconds`.
pub async fn run_server<F>(app: Router, config: &ServerConfig, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::with_source(ErrorKind::Configuration, "Invalid server address", e))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to bind listener", e))?;

    info!(address = %addr, "Visum API listening");

    let grace = Duration::from_secs(config.shutdown_grace_seconds);
    let (stopping_tx, mut stopping_rx) = watch::channel(false);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            let _ = stopping_tx.send(true);
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            result.map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;
        }
        _ = async {
            let _ = stopping_rx.wait_for(|stopping| *stopping).await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(grace_secs = grace.as_secs(), "Shutdown grace elapsed with connections still open");
        }
    }

    info!("Visum API stopped");
    Ok(())
}

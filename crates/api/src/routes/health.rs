//! Liveness and storage readiness.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// `GET /health` body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// `ok` when the storage directory exists, otherwise `unavailable`.
    pub storage: &'static str,
}

async fn health_check(State(state): State<AppState>) -> Response {
    let root = state.uploads.placer().root();
    let storage_ok = match tokio::fs::metadata(root).await {
        Ok(meta) => meta.is_dir(),
        Err(e) => {
            warn!(dir = %root.display(), error = %e, "Storage directory unavailable");
            false
        }
    };

    let (code, status, storage) = if storage_ok {
        (StatusCode::OK, "healthy", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        storage,
    };
    (code, Json(body)).into_response()
}

/// Creates the health route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

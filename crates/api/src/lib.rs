//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - `POST /upload` and `GET /files/{name}` routes
//! - Error-to-response mapping
//! - CORS and request tracing layers

pub mod error;
pub mod routes;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, header::InvalidHeaderValue};
use filedrop_core::upload::UploadService;
use filedrop_shared::AppConfig;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upload pipeline and storage location.
    pub uploads: Arc<UploadService>,
    /// Public base URL override for file links.
    pub base_url: Option<Arc<str>>,
    /// Honor `X-Forwarded-Proto` when deriving file links.
    pub trust_proxy: bool,
}

impl AppState {
    /// Create application state.
    #[must_use]
    pub fn new(uploads: UploadService, base_url: Option<String>) -> Self {
        Self {
            uploads: Arc::new(uploads),
            base_url: base_url.map(Arc::from),
            trust_proxy: false,
        }
    }

    /// Set whether proxy headers are trusted.
    #[must_use]
    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    /// Build application state from configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            UploadService::from_config(&config.storage),
            config.server.public_base_url(),
        )
        .with_trust_proxy(config.server.trust_proxy)
    }
}

/// Builds the CORS layer. `None` allows any origin.
///
/// # Errors
///
/// Returns an error if `origin` is not a valid header value.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, InvalidHeaderValue> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    Ok(match origin {
        None => layer.allow_origin(Any),
        Some(origin) => layer.allow_origin(HeaderValue::from_str(origin)?),
    })
}

/// Creates the main application router.
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    let body_limit = state.uploads.policy().body_limit();

    Router::new()
        .merge(routes::routes(body_limit))
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod files;
pub mod health;
pub mod upload;

/// Creates the router with all routes.
///
/// `body_limit` caps request bodies on the upload route.
pub fn routes(body_limit: usize) -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(upload::routes(body_limit))
        .merge(files::routes())
}

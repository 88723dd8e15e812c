//! File serving route.
//!
//! `GET /files/{name}` streams a stored file with a content type derived
//! from its extension. Only names the generator could have produced are
//! looked up.

use axum::{
    Router,
    body::Body,
    extract::{Path, Request, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use filedrop_core::naming::StorageName;
use filedrop_shared::AppError;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

use crate::{AppState, error::ApiError};

/// Creates the file serving route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/files/{name}", get(serve_file))
}

fn not_found() -> Response {
    ApiError::from(AppError::NotFound("file not found".into())).into_response()
}

/// GET `/files/{name}`
async fn serve_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
    request: Request,
) -> Response {
    let Some(name) = StorageName::parse(&name) else {
        debug!(requested = %name, "Rejected file name");
        return not_found();
    };

    let path = state.uploads.placer().path_of(&name);
    let response = match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    if response.status() == StatusCode::NOT_FOUND {
        return not_found();
    }

    let mut response = response.map(Body::new);
    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}

//! Upload route.
//!
//! `POST /upload` accepts a `multipart/form-data` body with a single file
//! under the `file` field and answers with the URL it is served at.

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{HeaderMap, StatusCode, Uri, header, uri::Authority},
    response::{IntoResponse, Response},
    routing::post,
};
use filedrop_core::upload::{DeclaredFile, StoredUpload, UploadError, UploadSession};
use serde::Serialize;

use crate::{AppState, error::ApiError};

/// Creates the upload route.
pub fn routes(body_limit: usize) -> Router<AppState> {
    Router::new().route(
        "/upload",
        post(upload).layer(DefaultBodyLimit::max(body_limit)),
    )
}

// ============================================================================
// Response Types
// ============================================================================

/// Successful upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Always `true`.
    pub success: bool,
    /// Public URL of the stored file.
    pub url: String,
    /// Metadata about the upload.
    pub meta: UploadMeta,
}

/// Upload metadata as declared by the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMeta {
    /// Original filename.
    pub original_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Declared media type.
    pub mime_type: String,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Base URL for file links: the configured override, or the request's
/// scheme and host.
///
/// The scheme comes from `X-Forwarded-Proto` only when proxy headers are
/// trusted. The host comes from `Host`, then the URI authority (HTTP/2).
fn base_url(state: &AppState, headers: &HeaderMap, uri: &Uri) -> String {
    if let Some(base) = &state.base_url {
        return base.to_string();
    }

    let forwarded_proto = state
        .trust_proxy
        .then(|| headers.get("x-forwarded-proto"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let scheme = forwarded_proto
        .or_else(|| uri.scheme_str())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(Authority::as_str))
        .unwrap_or("localhost");

    format!("{scheme}://{host}")
}

/// Map a multipart parser failure onto the upload taxonomy.
fn multipart_error(err: &MultipartError, max_file_size: u64) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::FileTooLarge { max: max_file_size }
    } else {
        UploadError::malformed(err.body_text())
    }
}

/// Feed every multipart part into the session.
async fn read_parts(
    session: &mut UploadSession<'_>,
    multipart: &mut Multipart,
    max_file_size: u64,
) -> Result<(), UploadError> {
    let parse_error = |e: MultipartError| multipart_error(&e, max_file_size);

    while let Some(mut field) = multipart.next_field().await.map_err(parse_error)? {
        // Plain form fields carry no file.
        if field.file_name().is_none() {
            continue;
        }

        let declared = DeclaredFile::new(field.file_name(), field.content_type());
        let field_name = field.name().map(str::to_owned);
        let incoming = session.open_file(field_name.as_deref(), declared).await?;

        while let Some(chunk) = field.chunk().await.map_err(parse_error)? {
            incoming.write(&chunk).await?;
        }
    }

    Ok(())
}

/// Receive the request body and commit the file.
async fn receive(state: &AppState, multipart: &mut Multipart) -> Result<StoredUpload, UploadError> {
    let max_file_size = state.uploads.policy().max_file_size();
    let mut session = state.uploads.session();

    match read_parts(&mut session, multipart, max_file_size).await {
        Ok(()) => session.finish().await,
        Err(e) => {
            session.abort().await;
            Err(e)
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/upload`
async fn upload(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            return ApiError::from(UploadError::malformed(rejection.body_text())).into_response();
        }
    };

    match receive(&state, &mut multipart).await {
        Ok(stored) => {
            let url = format!("{}/files/{}", base_url(&state, &headers, &uri), stored.name);
            let response = UploadResponse {
                success: true,
                url,
                meta: UploadMeta {
                    original_name: stored.original_name,
                    size: stored.size,
                    mime_type: stored.media_type,
                },
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

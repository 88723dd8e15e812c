//! Helpers for driving the router in-process.

use std::path::Path;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, Response, header},
};
use filedrop_core::storage::StoragePlacer;
use filedrop_core::upload::{UploadPolicy, UploadService};
use http_body_util::BodyExt;
use tempfile::TempDir;

use crate::{AppState, cors_layer, create_router};

const BOUNDARY: &str = "----FiledropTestBoundary7d93";

/// Host header sent with every test request.
pub const TEST_HOST: &str = "localhost:3000";

/// A router backed by a scratch storage directory.
pub struct TestApp {
    dir: TempDir,
    state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_base_url(None)
    }

    pub fn with_base_url(base_url: Option<&str>) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let uploads = UploadService::new(UploadPolicy::default(), StoragePlacer::new(dir.path()));
        let state = AppState::new(uploads, base_url.map(String::from));
        Self { dir, state }
    }

    /// An app that takes the scheme from `X-Forwarded-Proto`.
    pub fn behind_proxy() -> Self {
        let app = Self::new();
        Self {
            state: app.state.with_trust_proxy(true),
            dir: app.dir,
        }
    }

    /// An app whose storage root is a regular file, so every write fails.
    pub fn with_unusable_storage() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("not-a-directory");
        std::fs::write(&root, b"occupied").expect("write blocker");
        let uploads = UploadService::new(UploadPolicy::default(), StoragePlacer::new(root));
        let state = AppState::new(uploads, None);
        Self { dir, state }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone(), cors_layer(None).expect("cors"))
    }

    pub fn storage_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Names currently present in the storage directory.
    pub fn stored_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.storage_dir())
            .expect("storage dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// One multipart form part.
pub struct Part<'a> {
    pub field: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    /// A file part under the `file` field.
    pub fn file(filename: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            field: "file",
            filename: Some(filename),
            content_type: Some(content_type),
            data,
        }
    }

    /// A plain text field.
    pub fn text(field: &'a str, value: &'a str) -> Self {
        Self {
            field,
            filename: None,
            content_type: None,
            data: value.as_bytes(),
        }
    }
}

/// Encode parts as a `multipart/form-data` body.
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.field);
        if let Some(filename) = part.filename {
            disposition.push_str(&format!("; filename=\"{filename}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// `POST /upload` with the given parts.
pub fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::post("/upload")
        .header(header::HOST, TEST_HOST)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// `GET` for a path, with the test host.
pub fn get_request(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::HOST, TEST_HOST)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

/// Path component of a returned file URL, e.g. `/files/<name>`.
pub fn url_path(url: &str) -> &str {
    let start = url.find("/files/").expect("file url");
    &url[start..]
}

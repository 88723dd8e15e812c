//! Upload validation and orchestration.
//!
//! This module provides the upload pipeline that sits between the HTTP
//! layer and the storage directory:
//! - Policy checks (media type whitelist, size and file count limits)
//! - Storage name assignment
//! - Streaming writes through the storage placer
//!
//! The transport drives an [`UploadSession`] part by part; nothing becomes
//! servable until [`UploadSession::finish`] succeeds.

mod error;
mod policy;
mod service;
mod types;

#[cfg(test)]
mod policy_props;

pub use error::UploadError;
pub use policy::UploadPolicy;
pub use service::{FILE_FIELD, IncomingFile, UploadService, UploadSession};
pub use types::{DEFAULT_MEDIA_TYPE, DeclaredFile, StoredUpload};

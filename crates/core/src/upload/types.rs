//! Upload types and data structures.

use crate::naming::StorageName;

/// Media type assumed when a file part declares none.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// What the client claims about an uploaded file. Untrusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredFile {
    /// Original filename, for display only.
    pub original_name: String,
    /// Declared media type.
    pub media_type: String,
}

impl DeclaredFile {
    /// Build from optional multipart part metadata.
    #[must_use]
    pub fn new(original_name: Option<&str>, media_type: Option<&str>) -> Self {
        Self {
            original_name: original_name.unwrap_or_default().to_string(),
            media_type: media_type
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_MEDIA_TYPE)
                .to_string(),
        }
    }
}

/// A successfully stored upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Generated storage name.
    pub name: StorageName,
    /// Size in bytes.
    pub size: u64,
    /// Original filename as declared by the client.
    pub original_name: String,
    /// Media type as declared by the client.
    pub media_type: String,
}

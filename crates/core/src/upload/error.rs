//! Upload error types.

use filedrop_shared::AppError;
use thiserror::Error;

use crate::storage::StorageError;

/// Upload pipeline errors.
///
/// The `Display` text of the client-facing variants is exactly what the
/// client receives.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Declared media type is not on the whitelist.
    #[error("unsupported file type")]
    UnsupportedType {
        /// The rejected media type.
        media_type: String,
    },

    /// The request carried no file part.
    #[error("no file received")]
    MissingFile,

    /// A file was sent under a field other than the upload field.
    #[error("unexpected file field")]
    UnexpectedField {
        /// The offending field name.
        field: String,
    },

    /// The multipart body could not be parsed.
    #[error("malformed upload")]
    Malformed {
        /// Parser detail, for logs only.
        reason: String,
    },

    /// File exceeds the size limit.
    #[error("file too large")]
    FileTooLarge {
        /// Maximum allowed size.
        max: u64,
    },

    /// Request carries more files than allowed.
    #[error("too many files")]
    TooManyFiles {
        /// Maximum allowed file count.
        max: usize,
    },

    /// Persisting the file failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl UploadError {
    /// Create a malformed-body error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::UnsupportedType { .. }
            | UploadError::MissingFile
            | UploadError::UnexpectedField { .. }
            | UploadError::Malformed { .. } => Self::ClientInput(err.to_string()),
            UploadError::FileTooLarge { .. } | UploadError::TooManyFiles { .. } => {
                Self::Quota(err.to_string())
            }
            UploadError::Storage(e) => e.into(),
        }
    }
}

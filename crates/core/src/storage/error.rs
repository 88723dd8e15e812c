//! Storage error types.

use std::io;
use std::path::PathBuf;

use filedrop_shared::AppError;
use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage directory could not be created.
    #[error("failed to create storage directory {}: {source}", path.display())]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The staging file could not be created.
    #[error("failed to create staging file {}: {source}", path.display())]
    Stage {
        /// Staging file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Writing upload bytes failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Staging file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Flushing or renaming the finished file failed.
    #[error("failed to commit {}: {source}", path.display())]
    Commit {
        /// Final file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_maps_to_server_error() {
        let err = StorageError::Write {
            path: PathBuf::from("/data/.partial-x.jpg"),
            source: io::Error::new(io::ErrorKind::StorageFull, "disk full"),
        };
        let app: AppError = err.into();
        assert_eq!(app.status_code(), 500);
        assert_eq!(app.public_message(), "internal server error");
        assert!(app.to_string().contains("disk full"));
    }
}

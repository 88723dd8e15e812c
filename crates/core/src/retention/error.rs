//! Sweep error types.

use std::io;
use std::path::PathBuf;

use filedrop_shared::AppError;
use thiserror::Error;

/// Errors that abort a sweep pass.
///
/// Per-entry failures never abort a pass; they are logged and counted in
/// the pass report instead.
#[derive(Debug, Error)]
pub enum SweepError {
    /// The storage directory could not be listed.
    #[error("failed to read directory {}: {source}", path.display())]
    ReadDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl From<SweepError> for AppError {
    fn from(err: SweepError) -> Self {
        Self::Sweep(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_error_is_server_side() {
        let err = SweepError::ReadDir {
            path: PathBuf::from("/srv/uploads"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/srv/uploads"));

        let app = AppError::from(err);
        assert!(app.is_server_error());
        assert_eq!(app.error_code(), "SWEEP_ERROR");
    }
}

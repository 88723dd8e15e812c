//! Application-wide error types.

use thiserror::Error;

/// Message returned to clients for every server-side failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Application error taxonomy.
///
/// Every failure in the service is classified into exactly one of these
/// kinds before it reaches a client or a log line.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request itself is invalid (unsupported type, missing file).
    #[error("{0}")]
    ClientInput(String),

    /// The request exceeds a quota (file too large, too many files).
    #[error("{0}")]
    Quota(String),

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Writing to or preparing upload storage failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A retention sweep failed.
    #[error("sweep error: {0}")]
    Sweep(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ClientInput(_) => 400,
            Self::NotFound(_) => 404,
            Self::Quota(_) => 413,
            Self::Storage(_) | Self::Sweep(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for logs and API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ClientInput(_) => "CLIENT_INPUT",
            Self::Quota(_) => "QUOTA_EXCEEDED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Sweep(_) => "SWEEP_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the failure originates on the server side.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Storage(_) | Self::Sweep(_) | Self::Internal(_)
        )
    }

    /// Message that is safe to return to a client.
    ///
    /// Server-side details never leave the process.
    #[must_use]
    pub fn public_message(&self) -> &str {
        match self {
            Self::ClientInput(msg) | Self::Quota(msg) | Self::NotFound(msg) => msg,
            Self::Storage(_) | Self::Sweep(_) | Self::Internal(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

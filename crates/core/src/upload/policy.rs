//! Upload policy: media type whitelist, size and count limits.

use filedrop_shared::StorageConfig;

use super::error::UploadError;
use crate::naming::essence;

/// Slack added to the transport body limit for multipart framing.
const BODY_LIMIT_OVERHEAD: u64 = 1024 * 1024;

/// Decides whether an upload may proceed to storage.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    allowed_mime_types: Vec<String>,
    max_file_size: u64,
    max_files: usize,
}

impl UploadPolicy {
    /// Create a policy. Media types are compared by lowercase essence.
    #[must_use]
    pub fn new<I, S>(allowed_mime_types: I, max_file_size: u64, max_files: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_mime_types: allowed_mime_types
                .into_iter()
                .map(|m| essence(m.as_ref()))
                .filter(|m| !m.is_empty())
                .collect(),
            max_file_size,
            max_files,
        }
    }

    /// Build the policy from storage configuration.
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            &config.allowed_mime_types,
            config.max_file_size,
            config.max_files,
        )
    }

    /// Maximum accepted file size in bytes.
    #[must_use]
    pub const fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Maximum number of files per request.
    #[must_use]
    pub const fn max_files(&self) -> usize {
        self.max_files
    }

    /// Accepted media types (essences).
    #[must_use]
    pub fn allowed_mime_types(&self) -> &[String] {
        &self.allowed_mime_types
    }

    /// Check if a media type is on the whitelist.
    #[must_use]
    pub fn is_mime_type_allowed(&self, media_type: &str) -> bool {
        let essence = essence(media_type);
        self.allowed_mime_types.iter().any(|m| *m == essence)
    }

    /// Rule 1: the media type must be whitelisted.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::UnsupportedType`] otherwise.
    pub fn check_media_type(&self, media_type: &str) -> Result<(), UploadError> {
        if self.is_mime_type_allowed(media_type) {
            Ok(())
        } else {
            Err(UploadError::UnsupportedType {
                media_type: media_type.to_string(),
            })
        }
    }

    /// Rule 2: the size must not exceed the limit.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::FileTooLarge`] otherwise.
    pub fn check_size(&self, size: u64) -> Result<(), UploadError> {
        if size > self.max_file_size {
            Err(UploadError::FileTooLarge {
                max: self.max_file_size,
            })
        } else {
            Ok(())
        }
    }

    /// Rule 3: the request must not carry more files than allowed.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::TooManyFiles`] otherwise.
    pub fn check_file_count(&self, count: usize) -> Result<(), UploadError> {
        if count > self.max_files {
            Err(UploadError::TooManyFiles {
                max: self.max_files,
            })
        } else {
            Ok(())
        }
    }

    /// Apply all rules in priority order; the first failure wins.
    ///
    /// # Errors
    ///
    /// Returns the error of the first violated rule.
    pub fn check(&self, media_type: &str, size: u64, file_count: usize) -> Result<(), UploadError> {
        self.check_media_type(media_type)?;
        self.check_size(size)?;
        self.check_file_count(file_count)
    }

    /// Transport body limit, set above the policy so that the policy
    /// produces the rejection.
    #[must_use]
    pub fn body_limit(&self) -> usize {
        let files = u64::try_from(self.max_files).unwrap_or(u64::MAX);
        let limit = self
            .max_file_size
            .saturating_mul(files.saturating_add(1))
            .saturating_add(BODY_LIMIT_OVERHEAD);
        usize::try_from(limit).unwrap_or(usize::MAX)
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from_config(&StorageConfig::default())
    }
}

//! Upload service: validate, name and place incoming files.

use filedrop_shared::StorageConfig;
use tracing::{debug, info};

use super::error::UploadError;
use super::policy::UploadPolicy;
use super::types::{DeclaredFile, StoredUpload};
use crate::naming::StorageName;
use crate::storage::{PendingFile, StoragePlacer};

/// Name of the multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Drives the upload pipeline: Validator, then Name Generator, then Placer.
#[derive(Debug, Clone)]
pub struct UploadService {
    policy: UploadPolicy,
    placer: StoragePlacer,
}

impl UploadService {
    /// Create a new upload service.
    #[must_use]
    pub fn new(policy: UploadPolicy, placer: StoragePlacer) -> Self {
        Self { policy, placer }
    }

    /// Create an upload service from storage configuration.
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            UploadPolicy::from_config(config),
            StoragePlacer::new(&config.dir),
        )
    }

    /// The active policy.
    #[must_use]
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// The storage placer.
    #[must_use]
    pub fn placer(&self) -> &StoragePlacer {
        &self.placer
    }

    /// Start a multi-part upload session.
    #[must_use]
    pub fn session(&self) -> UploadSession<'_> {
        UploadSession {
            service: self,
            files_seen: 0,
            incoming: None,
        }
    }

    /// Accept a file: check its media type, assign a name and open staging.
    ///
    /// # Errors
    ///
    /// Returns an error if the media type is rejected or staging fails.
    pub async fn begin(&self, declared: DeclaredFile) -> Result<IncomingFile<'_>, UploadError> {
        self.policy.check_media_type(&declared.media_type)?;

        let name = StorageName::generate(&declared.media_type);
        let pending = self.placer.begin(name).await?;
        debug!(name = %pending.name(), mime_type = %declared.media_type, "Receiving upload");

        Ok(IncomingFile {
            policy: &self.policy,
            pending,
            declared,
        })
    }

    /// Store a fully buffered single file.
    ///
    /// # Errors
    ///
    /// Returns the first violated policy rule or a storage error.
    pub async fn store(
        &self,
        declared: DeclaredFile,
        bytes: &[u8],
    ) -> Result<StoredUpload, UploadError> {
        self.policy
            .check(&declared.media_type, bytes.len() as u64, 1)?;

        let mut incoming = self.begin(declared).await?;
        incoming.write(bytes).await?;
        incoming.finish().await
    }
}

/// A file whose bytes are being received.
///
/// Dropping it before [`IncomingFile::finish`] discards everything written.
#[derive(Debug)]
pub struct IncomingFile<'a> {
    policy: &'a UploadPolicy,
    pending: PendingFile,
    declared: DeclaredFile,
}

impl IncomingFile<'_> {
    /// Generated storage name.
    #[must_use]
    pub fn name(&self) -> &StorageName {
        self.pending.name()
    }

    /// Bytes accepted so far.
    #[must_use]
    pub const fn received(&self) -> u64 {
        self.pending.written()
    }

    /// Append a chunk, enforcing the size limit before writing it.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::FileTooLarge`] once the limit is crossed, or
    /// a storage error.
    pub async fn write(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
        let total = self.pending.written().saturating_add(chunk.len() as u64);
        self.policy.check_size(total)?;
        self.pending.write(chunk).await?;
        Ok(())
    }

    /// Commit the file under its generated name.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the commit fails.
    pub async fn finish(self) -> Result<StoredUpload, UploadError> {
        let stored = self.pending.commit().await?;
        info!(
            name = %stored.name,
            size = stored.size,
            mime_type = %self.declared.media_type,
            "File stored"
        );

        Ok(StoredUpload {
            name: stored.name,
            size: stored.size,
            original_name: self.declared.original_name,
            media_type: self.declared.media_type,
        })
    }

    /// Abandon the file and remove its staging data.
    pub async fn abort(self) {
        self.pending.discard().await;
    }
}

/// One request's worth of multipart parts.
///
/// Every file part counts toward the policy's file limit. Only the first
/// part named [`FILE_FIELD`] is stored; any other file part is rejected.
#[derive(Debug)]
pub struct UploadSession<'a> {
    service: &'a UploadService,
    files_seen: usize,
    incoming: Option<IncomingFile<'a>>,
}

impl<'a> UploadSession<'a> {
    /// Number of file parts seen so far.
    #[must_use]
    pub const fn files_seen(&self) -> usize {
        self.files_seen
    }

    /// Register a new file part and return the sink for its bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the part exceeds the file count, arrives under
    /// an unexpected field, or fails media type validation.
    pub async fn open_file(
        &mut self,
        field: Option<&str>,
        declared: DeclaredFile,
    ) -> Result<&mut IncomingFile<'a>, UploadError> {
        self.files_seen += 1;
        self.service.policy.check_file_count(self.files_seen)?;

        if field != Some(FILE_FIELD) || self.incoming.is_some() {
            return Err(UploadError::UnexpectedField {
                field: field.unwrap_or_default().to_string(),
            });
        }

        let incoming = self.service.begin(declared).await?;
        Ok(self.incoming.insert(incoming))
    }

    /// Commit the received file.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::MissingFile`] if no file part was received,
    /// or a storage error.
    pub async fn finish(self) -> Result<StoredUpload, UploadError> {
        let incoming = self.incoming.ok_or(UploadError::MissingFile)?;
        incoming.finish().await
    }

    /// Abandon the session, removing any staged data.
    pub async fn abort(self) {
        if let Some(incoming) = self.incoming {
            incoming.abort().await;
        }
    }
}

//! Storage placer: staged writes with atomic commit.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use super::error::StorageError;
use crate::naming::StorageName;

/// Prefix of in-progress upload files inside the storage directory.
pub const STAGING_PREFIX: &str = ".partial-";

/// A file that has been committed under its generated name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Generated storage name.
    pub name: StorageName,
    /// Final size in bytes.
    pub size: u64,
    /// Absolute or root-relative path of the stored file.
    pub path: PathBuf,
}

/// Owns the write path into the storage directory.
#[derive(Debug, Clone)]
pub struct StoragePlacer {
    root: PathBuf,
}

impl StoragePlacer {
    /// Create a placer writing into `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final path of a stored file.
    #[must_use]
    pub fn path_of(&self, name: &StorageName) -> PathBuf {
        self.root.join(name.as_str())
    }

    /// Staging path used while a file is being received.
    #[must_use]
    pub fn staging_path_of(&self, name: &StorageName) -> PathBuf {
        self.root.join(format!("{STAGING_PREFIX}{name}"))
    }

    /// Create the storage directory if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: self.root.clone(),
                source,
            })
    }

    /// Open a staging file for `name`.
    ///
    /// A failure to create the directory is only logged here; if the
    /// directory really is unusable, creating the staging file fails and
    /// that error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the staging file cannot be created.
    pub async fn begin(&self, name: StorageName) -> Result<PendingFile, StorageError> {
        if let Err(e) = self.ensure_dir().await {
            error!(error = %e, "Storage directory unavailable");
        }

        let staging = self.staging_path_of(&name);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&staging)
            .await
            .map_err(|source| StorageError::Stage {
                path: staging.clone(),
                source,
            })?;

        Ok(PendingFile {
            file: Some(file),
            target: self.path_of(&name),
            staging,
            name,
            written: 0,
            finished: false,
        })
    }
}

/// An upload being written to its staging file.
///
/// Dropping a `PendingFile` without calling [`PendingFile::commit`]
/// removes the staging file.
#[derive(Debug)]
pub struct PendingFile {
    file: Option<File>,
    staging: PathBuf,
    target: PathBuf,
    name: StorageName,
    written: u64,
    finished: bool,
}

impl PendingFile {
    /// The name the file will be committed under.
    #[must_use]
    pub fn name(&self) -> &StorageName {
        &self.name
    }

    /// Bytes written so far.
    #[must_use]
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Append a chunk of upload bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write(&mut self, chunk: &[u8]) -> Result<(), StorageError> {
        let file = self.file.as_mut().ok_or_else(|| StorageError::Write {
            path: self.staging.clone(),
            source: io::Error::other("staging file already closed"),
        })?;

        file.write_all(chunk)
            .await
            .map_err(|source| StorageError::Write {
                path: self.staging.clone(),
                source,
            })?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flush the staging file to disk and move it onto its final name.
    ///
    /// # Errors
    ///
    /// Returns an error if syncing or renaming fails; the staging file is
    /// removed in that case.
    pub async fn commit(mut self) -> Result<StoredFile, StorageError> {
        if let Some(mut file) = self.file.take() {
            let synced = match file.flush().await {
                Ok(()) => file.sync_all().await,
                Err(e) => Err(e),
            };
            drop(file);
            synced.map_err(|source| StorageError::Commit {
                path: self.target.clone(),
                source,
            })?;
        }

        fs::rename(&self.staging, &self.target)
            .await
            .map_err(|source| StorageError::Commit {
                path: self.target.clone(),
                source,
            })?;
        self.finished = true;

        Ok(StoredFile {
            name: self.name.clone(),
            size: self.written,
            path: self.target.clone(),
        })
    }

    /// Abandon the upload and remove its staging file.
    pub async fn discard(mut self) {
        drop(self.file.take());
        if let Err(e) = fs::remove_file(&self.staging).await {
            if e.kind() != io::ErrorKind::NotFound {
                error!(path = %self.staging.display(), error = %e, "Failed to remove staging file");
            }
        }
        self.finished = true;
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        drop(self.file.take());
        match std::fs::remove_file(&self.staging) {
            Ok(()) => debug!(path = %self.staging.display(), "Removed abandoned staging file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                error!(path = %self.staging.display(), error = %e, "Failed to remove staging file");
            }
        }
    }
}

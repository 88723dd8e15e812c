//! Retention sweeper: periodic scan-and-delete over the storage directory.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use filedrop_shared::AppError;
use futures::StreamExt;
use tokio::fs;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::error::SweepError;
use super::policy::RetentionPolicy;

/// Counters for one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries listed.
    pub scanned: usize,
    /// Expired files deleted.
    pub deleted: usize,
    /// Entries kept (young files, directories, other entry types).
    pub retained: usize,
    /// Entries that disappeared before they could be processed.
    pub vanished: usize,
    /// Entries whose stat or delete failed.
    pub failed: usize,
}

/// Outcome of processing a single directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryOutcome {
    Deleted,
    Retained,
    Vanished,
    Failed,
}

impl SweepReport {
    fn record(&mut self, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::Deleted => self.deleted += 1,
            EntryOutcome::Retained => self.retained += 1,
            EntryOutcome::Vanished => self.vanished += 1,
            EntryOutcome::Failed => self.failed += 1,
        }
    }
}

/// Deletes stored files older than the retention threshold.
#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    dir: PathBuf,
    policy: RetentionPolicy,
}

impl RetentionSweeper {
    /// Create a sweeper for `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, policy: RetentionPolicy) -> Self {
        Self {
            dir: dir.into(),
            policy,
        }
    }

    /// The directory being swept.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The active policy.
    #[must_use]
    pub const fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Run one pass against the current time.
    ///
    /// # Errors
    ///
    /// Returns an error only if the directory cannot be listed.
    pub async fn sweep_once(&self) -> Result<SweepReport, SweepError> {
        self.sweep_at(SystemTime::now()).await
    }

    /// Run one pass, judging ages against `now`.
    ///
    /// Entries are processed concurrently, at most
    /// [`RetentionPolicy::max_concurrency`] at a time, with no ordering
    /// between them.
    ///
    /// # Errors
    ///
    /// Returns an error only if the directory cannot be listed.
    pub async fn sweep_at(&self, now: SystemTime) -> Result<SweepReport, SweepError> {
        if let Some(cutoff) = now.checked_sub(self.policy.max_age()) {
            debug!(
                dir = %self.dir.display(),
                cutoff = %DateTime::<Utc>::from(cutoff).to_rfc3339(),
                "Starting retention sweep"
            );
        }

        let entries = self.list_entries().await?;
        Ok(self.process_entries(entries, now).await)
    }

    /// Process listed entries; a failing entry never stops the others.
    async fn process_entries(&self, entries: Vec<PathBuf>, now: SystemTime) -> SweepReport {
        let mut report = SweepReport {
            scanned: entries.len(),
            ..SweepReport::default()
        };

        let outcomes: Vec<EntryOutcome> = futures::stream::iter(entries)
            .map(|path| self.process_entry(path, now))
            .buffer_unordered(self.policy.max_concurrency())
            .collect()
            .await;

        for outcome in outcomes {
            report.record(outcome);
        }
        report
    }

    async fn list_entries(&self) -> Result<Vec<PathBuf>, SweepError> {
        let read_dir_error = |source: io::Error| SweepError::ReadDir {
            path: self.dir.clone(),
            source,
        };

        let mut dir = fs::read_dir(&self.dir).await.map_err(read_dir_error)?;
        let mut paths = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(read_dir_error)? {
            paths.push(entry.path());
        }
        Ok(paths)
    }

    async fn process_entry(&self, path: PathBuf, now: SystemTime) -> EntryOutcome {
        let meta = match fs::symlink_metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Entry vanished before stat");
                return EntryOutcome::Vanished;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to stat entry");
                return EntryOutcome::Failed;
            }
        };

        if !meta.is_file() {
            return EntryOutcome::Retained;
        }

        let modified = match meta.modified() {
            Ok(modified) => modified,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Modification time unavailable");
                return EntryOutcome::Failed;
            }
        };

        if !self.policy.is_expired(modified, now) {
            return EntryOutcome::Retained;
        }

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(path = %path.display(), "Removed expired file");
                EntryOutcome::Deleted
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Expired file already removed");
                EntryOutcome::Vanished
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to remove expired file");
                EntryOutcome::Failed
            }
        }
    }

    /// Run one pass and log its result. Never fails.
    async fn run_pass(&self) {
        match self.sweep_once().await {
            Ok(report) => info!(
                scanned = report.scanned,
                deleted = report.deleted,
                retained = report.retained,
                vanished = report.vanished,
                failed = report.failed,
                "Retention sweep complete"
            ),
            Err(e) => {
                let err = AppError::from(e);
                error!(code = err.error_code(), error = %err, "Retention sweep aborted");
            }
        }
    }

    /// Sweep every interval until `shutdown` is cancelled.
    ///
    /// The first pass runs one interval after start. Each pass is awaited
    /// before the next tick is taken, so passes never overlap; ticks missed
    /// while a pass is running are skipped.
    pub async fn run(&self, shutdown: CancellationToken) {
        let period = self.policy.sweep_interval();
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            dir = %self.dir.display(),
            max_age_secs = self.policy.max_age().as_secs(),
            interval_secs = period.as_secs(),
            "Retention sweeper started"
        );

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        () = shutdown.cancelled() => break,
                        () = self.run_pass() => {}
                    }
                }
            }
        }

        info!("Retention sweeper stopped");
    }

    /// Spawn [`RetentionSweeper::run`] as a background task.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn write_aged(dir: &Path, name: &str, age: Duration) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"payload").expect("write file");
        let file = std::fs::File::options()
            .write(true)
            .open(&path)
            .expect("open file");
        file.set_modified(SystemTime::now() - age)
            .expect("set mtime");
        path
    }

    fn sweeper_for(dir: &Path) -> RetentionSweeper {
        RetentionSweeper::new(dir, RetentionPolicy::default())
    }

    #[tokio::test]
    async fn test_deletes_only_expired_files() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let old = write_aged(tmp.path(), "old.jpg", 8 * DAY);
        let young = write_aged(tmp.path(), "young.jpg", 6 * DAY);
        let fresh = write_aged(tmp.path(), "fresh.png", Duration::ZERO);

        let report = sweeper_for(tmp.path()).sweep_once().await.expect("sweep");

        assert!(!old.exists());
        assert!(young.exists());
        assert!(fresh.exists());
        assert_eq!(
            report,
            SweepReport {
                scanned: 3,
                deleted: 1,
                retained: 2,
                vanished: 0,
                failed: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_file_crossing_threshold_is_deleted_by_later_pass() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = write_aged(tmp.path(), "a.gif", 6 * DAY);
        let sweeper = sweeper_for(tmp.path());
        let now = SystemTime::now();

        sweeper.sweep_at(now).await.expect("sweep");
        assert!(path.exists());

        sweeper.sweep_at(now + 2 * DAY).await.expect("sweep");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_skips_directories() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let sub = tmp.path().join("nested");
        std::fs::create_dir(&sub).expect("mkdir");

        let report = sweeper_for(tmp.path())
            .sweep_at(SystemTime::now() + 30 * DAY)
            .await
            .expect("sweep");

        assert!(sub.is_dir());
        assert_eq!(report.retained, 1);
        assert_eq!(report.deleted, 0);
    }

    #[tokio::test]
    async fn test_missing_directory_aborts_pass() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let sweeper = sweeper_for(&tmp.path().join("absent"));

        let err = sweeper.sweep_once().await.expect_err("no directory");
        assert!(matches!(err, SweepError::ReadDir { .. }));
    }

    #[tokio::test]
    async fn test_entry_failures_do_not_stop_pass() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let old = write_aged(tmp.path(), "old.jpg", 8 * DAY);
        let plain = write_aged(tmp.path(), "plain.jpg", DAY);
        let gone = tmp.path().join("gone.jpg");
        // stat through a regular file fails with ENOTDIR
        let not_a_dir = plain.join("child");

        let report = sweeper_for(tmp.path())
            .process_entries(
                vec![gone, not_a_dir, old.clone(), plain.clone()],
                SystemTime::now(),
            )
            .await;

        assert!(!old.exists());
        assert!(plain.exists());
        assert_eq!(
            report,
            SweepReport {
                scanned: 4,
                deleted: 1,
                retained: 1,
                vanished: 1,
                failed: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_single_entry_outcomes() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let plain = write_aged(tmp.path(), "plain.jpg", 8 * DAY);
        let sweeper = sweeper_for(tmp.path());
        let now = SystemTime::now();

        assert_eq!(
            sweeper.process_entry(tmp.path().join("gone.jpg"), now).await,
            EntryOutcome::Vanished
        );
        assert_eq!(
            sweeper.process_entry(plain.join("child"), now).await,
            EntryOutcome::Failed
        );
        assert_eq!(
            sweeper.process_entry(plain.clone(), now).await,
            EntryOutcome::Deleted
        );
    }

    #[tokio::test]
    async fn test_aborted_pass_is_logged_not_fatal() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let sweeper = sweeper_for(&tmp.path().join("absent"));

        sweeper.run_pass().await;
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let report = sweeper_for(tmp.path()).sweep_once().await.expect("sweep");
        assert_eq!(report, SweepReport::default());
    }

    #[tokio::test]
    async fn test_bounded_concurrency_processes_everything() {
        let tmp = tempfile::tempdir().expect("tempdir");
        for i in 0..50 {
            write_aged(tmp.path(), &format!("{i}.dat"), 10 * DAY);
        }
        let sweeper = RetentionSweeper::new(
            tmp.path(),
            RetentionPolicy::new(7 * DAY, DAY, 4),
        );

        let report = sweeper.sweep_once().await.expect("sweep");

        assert_eq!(report.scanned, 50);
        assert_eq!(report.deleted, 50);
        assert_eq!(std::fs::read_dir(tmp.path()).expect("dir").count(), 0);
    }

    #[tokio::test]
    async fn test_worker_sweeps_and_stops_on_cancel() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let old = write_aged(tmp.path(), "old.jpg", 8 * DAY);
        let young = write_aged(tmp.path(), "young.jpg", DAY);

        let sweeper = RetentionSweeper::new(
            tmp.path(),
            RetentionPolicy::new(7 * DAY, Duration::from_millis(20), 8),
        );
        let shutdown = CancellationToken::new();
        let handle = sweeper.spawn(shutdown.clone());

        let deadline = Instant::now() + Duration::from_secs(5);
        while old.exists() && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!old.exists(), "worker should remove expired file");
        assert!(young.exists());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("worker stops after cancel")
            .expect("worker did not panic");
    }

    #[tokio::test]
    async fn test_worker_waits_one_interval_before_first_pass() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let old = write_aged(tmp.path(), "old.jpg", 8 * DAY);

        let sweeper = RetentionSweeper::new(tmp.path(), RetentionPolicy::default());
        let shutdown = CancellationToken::new();
        let handle = sweeper.spawn(shutdown.clone());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(old.exists());

        shutdown.cancel();
        handle.await.expect("worker did not panic");
    }
}

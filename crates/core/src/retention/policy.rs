//! Retention policy.

use std::time::{Duration, SystemTime};

use filedrop_shared::RetentionConfig;

/// Shortest sweep interval the worker accepts.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Retention threshold, sweep period and per-pass parallelism.
///
/// Immutable for the lifetime of the sweeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    max_age: Duration,
    sweep_interval: Duration,
    max_concurrency: usize,
}

impl RetentionPolicy {
    /// Create a policy. Zero intervals and concurrency are raised to
    /// their minimum.
    #[must_use]
    pub fn new(max_age: Duration, sweep_interval: Duration, max_concurrency: usize) -> Self {
        Self {
            max_age,
            sweep_interval: sweep_interval.max(MIN_SWEEP_INTERVAL),
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Build the policy from retention configuration.
    #[must_use]
    pub fn from_config(config: &RetentionConfig) -> Self {
        Self::new(
            config.max_age(),
            config.sweep_interval(),
            config.max_concurrent_deletes,
        )
    }

    /// Maximum age a file may reach.
    #[must_use]
    pub const fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Time between sweep passes.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Entries processed in parallel within one pass.
    #[must_use]
    pub const fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Whether a file last modified at `modified` is past the threshold.
    ///
    /// Files with a modification time in the future are never expired.
    #[must_use]
    pub fn is_expired(&self, modified: SystemTime, now: SystemTime) -> bool {
        now.duration_since(modified)
            .is_ok_and(|age| age > self.max_age)
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::from_config(&RetentionConfig::default())
    }
}

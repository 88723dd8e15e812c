//! Application configuration management.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Upload storage configuration.
    pub storage: StorageConfig,
    /// Retention sweep configuration.
    pub retention: RetentionConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Allowed CORS origin. `None` or `"*"` allows any origin.
    pub cors_origin: Option<String>,
    /// Public base URL used when building file URLs.
    /// When unset, the URL is derived from the request.
    pub base_url: Option<String>,
    /// Take the URL scheme from `X-Forwarded-Proto`. Enable only behind a
    /// reverse proxy that sets it.
    pub trust_proxy: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origin: None,
            base_url: None,
            trust_proxy: false,
        }
    }
}

impl ServerConfig {
    /// Returns the configured base URL without a trailing slash.
    #[must_use]
    pub fn public_base_url(&self) -> Option<String> {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
    }

    /// Returns the allowed CORS origin, or `None` when any origin is allowed.
    #[must_use]
    pub fn restricted_origin(&self) -> Option<&str> {
        self.cors_origin
            .as_deref()
            .map(str::trim)
            .filter(|origin| !origin.is_empty() && *origin != "*")
    }
}

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding stored files.
    pub dir: PathBuf,
    /// Maximum accepted file size in bytes.
    pub max_file_size: u64,
    /// Maximum number of files per request.
    pub max_files: usize,
    /// Accepted media types.
    pub allowed_mime_types: Vec<String>,
}

impl StorageConfig {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
    /// Default number of files per request.
    pub const DEFAULT_MAX_FILES: usize = 1;

    /// Default accepted media types.
    #[must_use]
    pub fn default_mime_types() -> Vec<String> {
        vec![
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "image/gif".to_string(),
        ]
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            max_files: Self::DEFAULT_MAX_FILES,
            allowed_mime_types: Self::default_mime_types(),
        }
    }
}

/// Retention sweep configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Age after which a stored file is deleted, in seconds.
    pub max_age_secs: u64,
    /// Period between sweep passes, in seconds.
    pub sweep_interval_secs: u64,
    /// Upper bound on entries processed in parallel during one pass.
    pub max_concurrent_deletes: usize,
}

impl RetentionConfig {
    /// Default retention: 7 days.
    pub const DEFAULT_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;
    /// Default sweep interval: 24 hours.
    pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 24 * 60 * 60;
    /// Default per-pass parallelism.
    pub const DEFAULT_MAX_CONCURRENT_DELETES: usize = 64;

    /// Retention threshold as a [`Duration`].
    #[must_use]
    pub const fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    /// Sweep interval as a [`Duration`].
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_age_secs: Self::DEFAULT_MAX_AGE_SECS,
            sweep_interval_secs: Self::DEFAULT_SWEEP_INTERVAL_SECS,
            max_concurrent_deletes: Self::DEFAULT_MAX_CONCURRENT_DELETES,
        }
    }
}

impl AppConfig {
    /// Loads configuration from config files and the environment.
    ///
    /// `FILEDROP__SECTION__KEY` variables override file values, and the
    /// plain `PORT`, `CORS_ORIGIN` and `BASE_URL` variables override both.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("FILEDROP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("storage.allowed_mime_types")
                    .try_parsing(true),
            )
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("server.cors_origin", std::env::var("CORS_ORIGIN").ok())?
            .set_override_option("server.base_url", std::env::var("BASE_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

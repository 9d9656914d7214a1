//! Application configuration loaded from environment variables.
//!
//! Fail-fast loading with validation: required variables must be present
//! and valid or the process exits with a clear error message.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use guild_core::GuildError;
use guild_ledger::NotifyConfig;

/// Delay before the startup legacy import kicks off, so that boot is not
/// slowed down by the replay.
pub const DEFAULT_LEGACY_IMPORT_DELAY_SECS: u64 = 30;

/// Configuration errors during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

impl From<ConfigError> for GuildError {
    fn from(err: ConfigError) -> Self {
        GuildError::Validation {
            message: err.to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Canonical database connection string.
    pub database_url: String,

    /// Read-only connection string for the legacy database. Only required
    /// by the legacy import.
    pub legacy_database_url: Option<String>,

    /// Public base URL used to render deregistration links.
    pub public_base_url: String,

    /// Path to the organizer name mapping file.
    pub organizer_map_path: PathBuf,

    /// Seconds to wait before the startup legacy import.
    pub legacy_import_delay_secs: u64,

    /// Log filter directive.
    pub rust_log: String,

    /// Notification dispatcher settings.
    pub notify: NotifyConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `DATABASE_URL` is missing or a numeric
    /// variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let legacy_database_url = env::var("LEGACY_DATABASE_URL").ok();

        let public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

        let organizer_map_path = env::var("ORGANIZER_MAP")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("organizers.toml"));

        let legacy_import_delay_secs = match env::var("LEGACY_IMPORT_DELAY_SECS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "LEGACY_IMPORT_DELAY_SECS".to_string(),
                message: format!("'{raw}' is not a number of seconds"),
            })?,
            Err(_) => DEFAULT_LEGACY_IMPORT_DELAY_SECS,
        };

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let notify = NotifyConfig {
            enabled: env::var("NOTIFY_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            from_email: env::var("NOTIFY_FROM_EMAIL").ok(),
            from_name: Some(env::var("NOTIFY_FROM_NAME").unwrap_or_else(|_| "guild".to_string())),
        };

        Ok(Self {
            database_url,
            legacy_database_url,
            public_base_url,
            organizer_map_path,
            legacy_import_delay_secs,
            rust_log,
            notify,
        })
    }

    /// The legacy connection string, required by the legacy import.
    pub fn require_legacy_database_url(&self) -> Result<&str, ConfigError> {
        self.legacy_database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar("LEGACY_DATABASE_URL".to_string()))
    }
}

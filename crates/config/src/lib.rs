//! Configuration loading, validation, and management for Gleaner.
//!
//! Loads configuration from `~/.gleaner/config.toml` (or the file named by
//! `GLEANER_CONFIG`) with environment variable overrides. Validates all
//! settings at startup.

use gleaner_core::{FetchKey, Params};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Log levels accepted by `logging.level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Keys the registry bootstrap claims for built-in fetchers.
pub const RESERVED_KEYS: [&str; 1] = ["echo"];

/// The root configuration structure.
///
/// Maps directly to `~/.gleaner/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GleanerConfig {
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Fetch behavior applied at the calling layer
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Domain event bus settings
    #[serde(default)]
    pub events: EventsConfig,

    /// Base data seeded into every Context built by the CLI
    #[serde(default)]
    pub base_data: Params,

    /// Fetchers that serve fixed data declared in this file
    #[serde(default)]
    pub static_fetchers: Vec<StaticFetcherConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-call deadline wrapped around every configured fetcher. 0 = none.
    #[serde(default)]
    pub timeout_secs: u64,

    /// Run batch fetches concurrently instead of in order
    #[serde(default)]
    pub concurrent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

fn default_event_capacity() -> usize {
    256
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

/// A fetcher that returns the `data` table, optionally with a fallback.
///
/// An entry with only a `fallback` acts as a placeholder for a data source
/// that is not wired up yet: every fetch fails and the fallback is served.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticFetcherConfig {
    /// Fetch key to register under
    pub key: String,

    #[serde(default)]
    pub description: String,

    /// Data to serve. Without it the source reports itself unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Params>,

    /// Served when `data` is missing; makes the fetcher fallback-capable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Params>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_params: Vec<String>,

    /// Whether this fetcher is registered (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl GleanerConfig {
    /// Load configuration from `GLEANER_CONFIG` or the default path
    /// (~/.gleaner/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `GLEANER_LOG_LEVEL`
    /// - `GLEANER_FETCH_TIMEOUT_SECS`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_overrides(&Self::config_path())
    }

    /// Load from `path`, then apply environment overrides.
    pub fn load_with_overrides(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `GLEANER_*` overrides, reading each variable through `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(level) = lookup("GLEANER_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }

        if let Some(timeout) = lookup("GLEANER_FETCH_TIMEOUT_SECS") {
            self.fetch.timeout_secs = timeout.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "GLEANER_FETCH_TIMEOUT_SECS must be a whole number of seconds, got '{timeout}'"
                ))
            })?;
        }

        Ok(())
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".gleaner")
    }

    /// The config file to load: `GLEANER_CONFIG` or `config.toml` in the
    /// configuration directory.
    pub fn config_path() -> PathBuf {
        std::env::var("GLEANER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::config_dir().join("config.toml"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }

        if self.events.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "events.capacity must be > 0".into(),
            ));
        }

        let mut seen = HashSet::new();
        for fetcher in &self.static_fetchers {
            FetchKey::parse(fetcher.key.as_str())
                .map_err(|e| ConfigError::ValidationError(format!("static_fetchers: {e}")))?;
            if RESERVED_KEYS.contains(&fetcher.key.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "static_fetchers: key '{}' is reserved for a built-in fetcher",
                    fetcher.key
                )));
            }
            if !seen.insert(fetcher.key.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "static_fetchers: duplicate key '{}'",
                    fetcher.key
                )));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

//! Configuration management for umbra.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
///
/// This is loaded from `~/.config/umbra/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scan orchestration settings
    pub scanning: ScanningConfig,
    /// Per-provider rate limiting defaults
    pub rate_limit: RateLimitConfig,
}

/// Scan orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Maximum number of providers running concurrently
    pub max_concurrent: usize,
    /// Per-provider timeout in seconds
    pub timeout_per_provider_secs: f64,
    /// Profile used when the caller doesn't name one
    pub default_profile: String,
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            timeout_per_provider_secs: 30.0,
            default_profile: "full".to_string(),
        }
    }
}

/// Default rate-limit settings applied to providers without explicit config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Token refill rate (tokens per second)
    pub tokens_per_second: f64,
    /// Burst capacity of the token bucket
    pub bucket_capacity: u32,
    /// Maximum retry attempts for retryable failures
    pub max_retries: u32,
    /// Exponential backoff base (wait = factor^attempt seconds)
    pub backoff_factor: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            tokens_per_second: 1.0,
            bucket_capacity: 5,
            max_retries: 3,
            backoff_factor: 2.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, falling back to defaults
    /// if the file doesn't exist.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `UMBRA_MAX_CONCURRENT`: Override scanning concurrency
    /// - `UMBRA_TIMEOUT_PER_PROVIDER`: Override per-provider timeout (seconds)
    /// - `UMBRA_DEFAULT_PROFILE`: Override the default scan profile
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env();
        Ok(config)
    }

    /// Apply environment variable overrides to an already-loaded config.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("UMBRA_MAX_CONCURRENT") {
            if let Ok(max) = val.parse() {
                self.scanning.max_concurrent = max;
                tracing::debug!("Override scanning.max_concurrent from env: {}", max);
            }
        }

        if let Ok(val) = std::env::var("UMBRA_TIMEOUT_PER_PROVIDER") {
            if let Ok(secs) = val.parse() {
                self.scanning.timeout_per_provider_secs = secs;
                tracing::debug!("Override scanning.timeout_per_provider_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("UMBRA_DEFAULT_PROFILE") {
            self.scanning.default_profile = val.clone();
            tracing::debug!("Override scanning.default_profile from env: {}", val);
        }
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> ConfigResult<()> {
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/umbra/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("io", "umbra", "umbra").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

//! Configuration management for Linklens
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{LinklensError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Base URL of the hosted URL analyzer API.
pub const DEFAULT_API_BASE: &str = "https://hackhazard-groq-url-analyzer.onrender.com/api";

/// Main configuration structure for Linklens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Retry policy for mutating calls that support it
    #[serde(default)]
    pub retry: RetryConfig,

    /// Where the session credential is persisted
    #[serde(default)]
    pub session: SessionConfig,

    /// Delays and durations used by the view layer
    #[serde(default)]
    pub ui: UiConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    #[serde(default = "default_api_base")]
    pub base_url: String,

    /// Transport timeout for the delete call (seconds)
    #[serde(default = "default_delete_timeout")]
    pub delete_timeout_seconds: u64,

    /// Optional transport timeout for every other call (seconds).
    ///
    /// When unset the transport default applies.
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_delete_timeout() -> u64 {
    15
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
            delete_timeout_seconds: default_delete_timeout(),
            request_timeout_seconds: None,
        }
    }
}

impl ApiConfig {
    /// Timeout applied to the delete call
    pub fn delete_timeout(&self) -> Duration {
        Duration::from_secs(self.delete_timeout_seconds)
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Additional attempts after the first one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed wait between attempts (milliseconds)
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_max_retries() -> u32 {
    2
}

fn default_backoff_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

/// Credential storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// JSON file in the user's data directory
    #[default]
    File,
    /// OS native keyring
    Keyring,
}

impl std::str::FromStr for SessionBackend {
    type Err = LinklensError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "keyring" => Ok(Self::Keyring),
            other => Err(LinklensError::Config(format!(
                "Invalid session backend: {}. Must be one of: file, keyring",
                other
            ))),
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Backend used to persist the credential
    #[serde(default)]
    pub backend: SessionBackend,

    /// Explicit path for the file backend
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// View-layer timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Delay before redirecting to login after an auth failure (ms)
    #[serde(default = "default_redirect_delay")]
    pub redirect_delay_ms: u64,

    /// Lifetime of a toast notification (ms)
    #[serde(default = "default_toast_duration")]
    pub toast_duration_ms: u64,

    /// Delay before leaving the verification page after success (ms)
    #[serde(default = "default_verify_redirect_delay")]
    pub verify_redirect_delay_ms: u64,

    /// Delay before opening the chat view after an analysis (ms)
    #[serde(default = "default_analyze_redirect_delay")]
    pub analyze_redirect_delay_ms: u64,
}

fn default_redirect_delay() -> u64 {
    1500
}

fn default_toast_duration() -> u64 {
    5000
}

fn default_verify_redirect_delay() -> u64 {
    1000
}

fn default_analyze_redirect_delay() -> u64 {
    400
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            redirect_delay_ms: default_redirect_delay(),
            toast_duration_ms: default_toast_duration(),
            verify_redirect_delay_ms: default_verify_redirect_delay(),
            analyze_redirect_delay_ms: default_analyze_redirect_delay(),
        }
    }
}

impl UiConfig {
    /// Delay before an auth-failure redirect
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    /// Default toast lifetime
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    /// Delay between a successful email verification and the dashboard
    pub fn verify_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.verify_redirect_delay_ms)
    }

    /// Delay between a finished analysis and the chat page
    pub fn analyze_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.analyze_redirect_delay_ms)
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| LinklensError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| LinklensError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base) = std::env::var("LINKLENS_API_BASE") {
            self.api.base_url = base;
        }

        if let Ok(timeout) = std::env::var("LINKLENS_DELETE_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.delete_timeout_seconds = value;
            } else {
                tracing::warn!("Ignoring invalid LINKLENS_DELETE_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(retries) = std::env::var("LINKLENS_MAX_RETRIES") {
            if let Ok(value) = retries.parse() {
                self.retry.max_retries = value;
            } else {
                tracing::warn!("Ignoring invalid LINKLENS_MAX_RETRIES: {}", retries);
            }
        }

        if let Ok(backoff) = std::env::var("LINKLENS_RETRY_BACKOFF_MS") {
            if let Ok(value) = backoff.parse() {
                self.retry.backoff_ms = value;
            } else {
                tracing::warn!("Ignoring invalid LINKLENS_RETRY_BACKOFF_MS: {}", backoff);
            }
        }

        if let Ok(backend) = std::env::var("LINKLENS_SESSION_BACKEND") {
            match backend.parse() {
                Ok(value) => self.session.backend = value,
                Err(e) => tracing::warn!("Ignoring LINKLENS_SESSION_BACKEND: {}", e),
            }
        }

        if let Ok(path) = std::env::var("LINKLENS_SESSION_PATH") {
            self.session.path = Some(PathBuf::from(path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base) = &cli.api_base {
            tracing::debug!("Using API base override: {}", base);
            self.api.base_url = base.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.api.base_url).map_err(|e| {
            LinklensError::Config(format!("Invalid api.base_url {}: {}", self.api.base_url, e))
        })?;

        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(LinklensError::Config(format!(
                "api.base_url must use http or https, got {}",
                base.scheme()
            ))
            .into());
        }

        if self.api.delete_timeout_seconds == 0 {
            return Err(LinklensError::Config(
                "api.delete_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.api.request_timeout_seconds == Some(0) {
            return Err(LinklensError::Config(
                "api.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.retry.max_retries > 10 {
            return Err(LinklensError::Config(
                "retry.max_retries must be less than or equal to 10".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            retry: RetryConfig::default(),
            session: SessionConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

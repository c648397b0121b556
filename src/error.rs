//! Error types for Linklens
//!
//! Local failures (configuration, credential storage, bad base URLs) are
//! expressed with [`LinklensError`]. Failures reported by the remote service
//! never surface here: the API layer folds them into
//! [`crate::api::ApiResponse::Failure`] instead.

use thiserror::Error;

/// Main error type for Linklens operations
#[derive(Error, Debug)]
pub enum LinklensError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Client-side form validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credential storage and session errors
    #[error("Session error: {0}")]
    Session(String),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// URL parsing errors
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias for Linklens operations
///
/// Uses `anyhow::Error` so callers can attach context while still being able
/// to downcast to [`LinklensError`].
pub type Result<T> = anyhow::Result<T>;

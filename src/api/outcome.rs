//! Normalized call results and the shared response classifier
//!
//! Every façade call resolves to an [`ApiResponse`]; callers branch on
//! success and, where relevant, on [`ApiResponse::is_auth_error`]. Raw
//! transport errors never cross this boundary.
//!
//! Internally a single transport attempt is described by an [`Attempt`],
//! which additionally distinguishes retryable from terminal failures so the
//! retry driver can branch on an explicit tag.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Message shown whenever the server rejects the credential.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

/// Message used when a 2xx body does not match the expected shape.
pub const UNEXPECTED_RESPONSE_MESSAGE: &str = "Unexpected response from server";

/// Category of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credential missing, invalid or expired (HTTP 401/403)
    Auth,
    /// The chat endpoint could not process the page content
    ContentTooLarge,
    /// Server-side failure (HTTP 5xx)
    Server,
    /// No response at all (connection failure, timeout)
    Network,
    /// Any other rejection, usually a 4xx with a server message
    Generic,
}

/// A failed call with its user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Credential rejection with the standard session-expired message
    pub fn auth() -> Self {
        Self::new(FailureKind::Auth, SESSION_EXPIRED_MESSAGE)
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Generic, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Network, message)
    }

    pub fn is_auth(&self) -> bool {
        self.kind == FailureKind::Auth
    }

    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, FailureKind::Server | FailureKind::Network)
    }
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Normalized result of a façade call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success(T),
    Failure(ApiFailure),
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// `true` when the credential was rejected and has been cleared.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Failure(failure) if failure.is_auth())
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(&failure.message),
        }
    }

    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ApiResponse<U> {
        match self {
            Self::Success(data) => ApiResponse::Success(f(data)),
            Self::Failure(failure) => ApiResponse::Failure(failure),
        }
    }

    pub fn into_result(self) -> std::result::Result<T, ApiFailure> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure(failure) => Err(failure),
        }
    }
}

/// Serializes into `{success: true, data}` or
/// `{success: false, error, authError?: true}`.
impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success(data) => {
                let mut out = serializer.serialize_struct("ApiResponse", 2)?;
                out.serialize_field("success", &true)?;
                out.serialize_field("data", data)?;
                out.end()
            }
            Self::Failure(failure) => {
                let len = if failure.is_auth() { 3 } else { 2 };
                let mut out = serializer.serialize_struct("ApiResponse", len)?;
                out.serialize_field("success", &false)?;
                out.serialize_field("error", &failure.message)?;
                if failure.is_auth() {
                    out.serialize_field("authError", &true)?;
                }
                out.end()
            }
        }
    }
}

/// Outcome of a single transport attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    Success(T),
    /// Server error or no response; another attempt may succeed
    RetryableFailure(ApiFailure),
    /// Anything a retry cannot fix, including credential rejection
    TerminalFailure(ApiFailure),
}

impl<T> Attempt<T> {
    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            Self::Success(_) => None,
            Self::RetryableFailure(failure) | Self::TerminalFailure(failure) => Some(failure),
        }
    }
}

impl<T> From<Attempt<T>> for ApiResponse<T> {
    fn from(attempt: Attempt<T>) -> Self {
        match attempt {
            Attempt::Success(data) => ApiResponse::Success(data),
            Attempt::RetryableFailure(failure) | Attempt::TerminalFailure(failure) => {
                ApiResponse::Failure(failure)
            }
        }
    }
}

/// Extract the `message` field from a JSON error body.
pub fn server_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Map a received response onto the failure taxonomy.
///
/// - 2xx decodes the body as `T` (an empty body decodes as JSON `null`)
/// - 401/403 is a terminal auth failure
/// - 5xx is retryable
/// - other statuses are terminal, carrying the server's message when it
///   sent one and `fallback` otherwise
pub fn classify<T: DeserializeOwned>(status: StatusCode, body: &[u8], fallback: &str) -> Attempt<T> {
    if status.is_success() {
        let payload: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            body
        };
        return match serde_json::from_slice(payload) {
            Ok(data) => Attempt::Success(data),
            Err(e) => {
                tracing::error!("Failed to decode {} response: {}", status, e);
                Attempt::TerminalFailure(ApiFailure::generic(UNEXPECTED_RESPONSE_MESSAGE))
            }
        };
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Attempt::TerminalFailure(ApiFailure::auth());
    }

    let message = server_message(body).unwrap_or_else(|| fallback.to_string());
    if status.is_server_error() {
        Attempt::RetryableFailure(ApiFailure::new(FailureKind::Server, message))
    } else {
        Attempt::TerminalFailure(ApiFailure::generic(message))
    }
}

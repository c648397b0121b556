//! Client for the URL analyzer HTTP API
//!
//! - [`client`]: [`ApiClient`], credential attachment and classification
//! - [`outcome`]: [`ApiResponse`], [`Attempt`] and the shared classifier
//! - [`retry`]: bounded fixed-backoff retry for the delete call
//! - `auth`, `urls`, `chat`: the domain façade, as methods on [`ApiClient`]

pub mod auth;
pub mod chat;
pub mod client;
pub mod outcome;
pub mod retry;
pub mod urls;

pub use chat::CONTENT_TOO_LARGE_MESSAGE;
pub use client::ApiClient;
pub use outcome::{ApiFailure, ApiResponse, Attempt, FailureKind, SESSION_EXPIRED_MESSAGE};
pub use retry::RetryPolicy;
pub use urls::DELETE_EXHAUSTED_MESSAGE;

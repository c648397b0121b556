//! Test utilities for linklens
//!
//! Ready-made clients and sample records for the unit tests.

use std::time::Duration;

use crate::api::{ApiClient, RetryPolicy};
use crate::config::Config;
use crate::models::{UrlRecord, UserProfile};
use crate::session::Session;

/// Client with an in-memory session and a retry backoff short enough for
/// tests
pub fn test_client(base_url: &str) -> ApiClient {
    let mut config = Config::default();
    config.api.base_url = base_url.to_string();
    ApiClient::new(&config, Session::in_memory())
        .expect("valid test client")
        .with_retry_policy(RetryPolicy::new(2, Duration::from_millis(10)))
}

pub fn profile(username: &str) -> UserProfile {
    UserProfile {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        created_at: None,
        plan: None,
        status: None,
    }
}

pub fn record(id: &str, title: &str) -> UrlRecord {
    serde_json::from_value(serde_json::json!({
        "_id": id,
        "originalUrl": format!("https://example.com/{}", id),
        "title": title,
    }))
    .expect("valid record")
}

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use linklens::api::RetryPolicy;
use linklens::config::UiConfig;
use linklens::models::UserProfile;
use linklens::session::{CredentialStore, MemoryCredentialStore, TOKEN_KEY};
use linklens::{ApiClient, Config, Session};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::MockServer;

#[allow(dead_code)]
pub const VALID_TOKEN: &str = "valid-token-0123456789";

/// Client talking to `server` under `/api`, with an in-memory session and a
/// short retry backoff.
#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> ApiClient {
    client_with_store(server, Arc::new(MemoryCredentialStore::new()))
}

/// Same as [`client_for`] but over a caller-provided credential store.
#[allow(dead_code)]
pub fn client_with_store(server: &MockServer, store: Arc<dyn CredentialStore>) -> ApiClient {
    let mut config = Config::default();
    config.api.base_url = format!("{}/api", server.uri());
    ApiClient::new(&config, Session::new(store))
        .expect("failed to build client")
        .with_retry_policy(RetryPolicy::new(2, Duration::from_millis(10)))
}

/// Client whose session already holds [`VALID_TOKEN`] and a profile.
#[allow(dead_code)]
pub fn signed_in_client(server: &MockServer) -> ApiClient {
    let client = client_for(server);
    sign_in(&client);
    client
}

#[allow(dead_code)]
pub fn sign_in(client: &ApiClient) {
    client
        .session()
        .establish(VALID_TOKEN, Some(profile("alice")))
        .expect("failed to establish session");
}

/// Memory store pre-seeded with a raw persisted credential value.
#[allow(dead_code)]
pub fn store_with_token(value: &str) -> Arc<MemoryCredentialStore> {
    let store = Arc::new(MemoryCredentialStore::new());
    store.set(TOKEN_KEY, value).expect("failed to seed store");
    store
}

/// UI timings short enough to keep tests fast.
#[allow(dead_code)]
pub fn fast_ui() -> UiConfig {
    UiConfig {
        redirect_delay_ms: 10,
        ..UiConfig::default()
    }
}

#[allow(dead_code)]
pub fn profile(username: &str) -> UserProfile {
    serde_json::from_value(profile_json(username)).expect("valid profile")
}

#[allow(dead_code)]
pub fn profile_json(username: &str) -> Value {
    json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "plan": "free",
    })
}

/// Wire shape of one analyzed URL record.
#[allow(dead_code)]
pub fn record_json(id: &str, title: &str) -> Value {
    json!({
        "_id": id,
        "originalUrl": format!("https://example.com/{}", id),
        "title": title,
        "summary": format!("Summary of {}", title),
        "metadata": { "description": "A page" },
        "headings": ["Intro", "Details"],
        "content": "Body text",
        "createdAt": "2024-05-01T10:00:00Z"
    })
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

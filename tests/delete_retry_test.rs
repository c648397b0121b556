//! Integration tests for the retrying delete call
//!
//! Transient failures (5xx, no response) are retried up to the attempt
//! budget; client errors and credential rejections end the call at once.

mod common;

use std::time::Duration;

use common::{client_for, signed_in_client};
use linklens::api::{RetryPolicy, DELETE_EXHAUSTED_MESSAGE, SESSION_EXPIRED_MESSAGE};
use serde_json::json;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn delete_mock(status: u16) -> Mock {
    Mock::given(method("DELETE"))
        .and(path("/api/urls/rec1"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"message": "server says"})))
}

#[tokio::test]
async fn test_delete_success_first_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/urls/rec1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "URL deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = signed_in_client(&server).delete_url("rec1").await;
    assert!(response.is_success());
}

#[tokio::test]
async fn test_delete_empty_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/urls/rec1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    assert!(signed_in_client(&server).delete_url("rec1").await.is_success());
}

#[tokio::test]
async fn test_delete_gives_up_after_three_server_errors() {
    let server = MockServer::start().await;
    delete_mock(500).expect(3).mount(&server).await;

    let response = signed_in_client(&server).delete_url("rec1").await;

    assert!(!response.is_auth_error());
    assert_eq!(response.error(), Some(DELETE_EXHAUSTED_MESSAGE));
}

#[tokio::test]
async fn test_delete_recovers_after_transient_error() {
    let server = MockServer::start().await;
    delete_mock(502).up_to_n_times(1).expect(1).mount(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/urls/rec1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(signed_in_client(&server).delete_url("rec1").await.is_success());
}

#[tokio::test]
async fn test_delete_forbidden_is_single_attempt() {
    let server = MockServer::start().await;
    delete_mock(403).expect(1).mount(&server).await;

    let client = signed_in_client(&server);
    let response = client.delete_url("rec1").await;

    assert!(response.is_auth_error());
    assert_eq!(response.error(), Some(SESSION_EXPIRED_MESSAGE));
    assert!(client.session().credential().is_none());
}

#[tokio::test]
async fn test_delete_not_found_is_single_attempt_with_server_message() {
    let server = MockServer::start().await;
    delete_mock(404).expect(1).mount(&server).await;

    let response = signed_in_client(&server).delete_url("rec1").await;

    assert!(!response.is_auth_error());
    assert_eq!(response.error(), Some("server says"));
}

#[tokio::test]
async fn test_delete_rejection_without_message_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/urls/rec1"))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;

    let response = signed_in_client(&server).delete_url("rec1").await;

    assert!(!response.is_auth_error());
    assert_eq!(response.error(), Some("Server returned status 409"));
}

#[tokio::test]
async fn test_delete_without_credential_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let response = client_for(&server).delete_url("rec1").await;
    assert!(response.is_auth_error());
}

#[tokio::test]
async fn test_delete_retries_on_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/urls/rec1"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut config = linklens::Config::default();
    config.api.base_url = format!("{}/api", server.uri());
    config.api.delete_timeout_seconds = 1;
    let client = linklens::ApiClient::new(&config, linklens::Session::in_memory())
        .unwrap()
        .with_retry_policy(RetryPolicy::new(1, Duration::from_millis(10)));
    common::sign_in(&client);

    let response = client.delete_url("rec1").await;
    assert_eq!(response.error(), Some(DELETE_EXHAUSTED_MESSAGE));

    let received = server.received_requests().await.unwrap_or_default();
    assert_eq!(received.len(), 2);
}

//! Integration tests for the view controllers
//!
//! Each test drives a controller against a wiremock server and inspects the
//! effects it returns together with the resulting session and view state.

mod common;

use std::time::{Duration, Instant};

use common::{client_for, fast_ui, profile_json, record_json, signed_in_client, VALID_TOKEN};
use linklens::models::Role;
use linklens::validation::{Field, LoginForm, RegistrationForm};
use linklens::views::analyze::AnalyzeController;
use linklens::views::auth::{AuthController, ForgotPasswordFlow, ResendCooldown, ResetStep};
use linklens::views::chat::{ChatView, CONTENT_TOO_LARGE_REPLY};
use linklens::views::dashboard::Dashboard;
use linklens::views::{Route, ToastLevel, ViewEffect, SESSION_EXPIRED_NOTICE};
use serde_json::json;
use wiremock::matchers::{any, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn login_form() -> LoginForm {
    LoginForm {
        email: "alice@example.com".into(),
        password: "secret123".into(),
    }
}

fn first_toast(update: &linklens::ViewUpdate) -> Option<(ToastLevel, &str)> {
    update
        .toasts()
        .next()
        .map(|toast| (toast.level, toast.message.as_str()))
}

// ---------------------------------------------------------------------------
// Login and registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_login_success_persists_credential_and_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "alice@example.com", "password": "secret123"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": VALID_TOKEN,
            "user": profile_json("alice"),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let auth = AuthController::new(client.clone(), fast_ui());
    let update = auth.login(&login_form(), Some("analyze")).await;

    assert!(update.is_valid());
    assert_eq!(update.navigation(), Some(&Route::Analyze));
    assert_eq!(
        first_toast(&update),
        Some((ToastLevel::Success, "Login successful! Redirecting..."))
    );
    assert_eq!(client.session().credential().as_deref(), Some(VALID_TOKEN));
    assert!(client.session().is_authenticated());
}

#[tokio::test]
async fn test_login_without_profile_fetches_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": VALID_TOKEN})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json("alice")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let update = AuthController::new(client.clone(), fast_ui())
        .login(&login_form(), None)
        .await;

    assert_eq!(update.navigation(), Some(&Route::Dashboard));
    assert_eq!(
        client.session().user().map(|u| u.username),
        Some("alice".to_string())
    );
}

#[tokio::test]
async fn test_login_needing_verification_persists_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "needsVerification": true,
            "message": "Please verify your email first",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let update = AuthController::new(client.clone(), fast_ui())
        .login(&login_form(), None)
        .await;

    assert_eq!(
        update.navigation(),
        Some(&Route::VerifyEmail {
            email: "alice@example.com".into()
        })
    );
    assert_eq!(
        first_toast(&update),
        Some((ToastLevel::Info, "Please verify your email first"))
    );
    assert!(client.session().credential().is_none());
    assert_eq!(
        client.session().pending_verification().map(|p| p.email),
        Some("alice@example.com".to_string())
    );
}

#[tokio::test]
async fn test_login_unknown_user_marks_email_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "User not found"})))
        .mount(&server)
        .await;

    let update = AuthController::new(client_for(&server), fast_ui())
        .login(&login_form(), None)
        .await;

    assert_eq!(update.field_errors.get(Field::Email), Some("User not found"));
    assert!(update.navigation().is_none());
}

#[tokio::test]
async fn test_invalid_registration_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let auth = AuthController::new(client_for(&server), fast_ui());
    let update = auth
        .register(&RegistrationForm {
            username: "al".into(),
            email: "not-an-email".into(),
            password: "123".into(),
            confirm_password: "456".into(),
        })
        .await;

    assert!(!update.is_valid());
    assert!(update.field_errors.get(Field::Username).is_some());
    assert!(update.field_errors.get(Field::Email).is_some());
    assert!(update.field_errors.get(Field::Password).is_some());
    assert!(update.field_errors.get(Field::ConfirmPassword).is_some());
    assert!(update.navigation().is_none());
}

#[tokio::test]
async fn test_registration_conflict_marks_username() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Username is already in use"})),
        )
        .mount(&server)
        .await;

    let update = AuthController::new(client_for(&server), fast_ui())
        .register(&RegistrationForm {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "secret123".into(),
            confirm_password: "secret123".into(),
        })
        .await;

    assert_eq!(
        update.field_errors.get(Field::Username),
        Some("Username already taken")
    );
}

#[tokio::test]
async fn test_verify_email_signs_in_and_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify-registration"))
        .and(body_json(json!({"email": "alice@example.com", "otp": "123456"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": VALID_TOKEN,
            "user": profile_json("alice"),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let auth = AuthController::new(client.clone(), fast_ui());
    let update = auth.verify_email("alice@example.com", "123456").await;

    assert!(matches!(
        update.effects.last(),
        Some(ViewEffect::Navigate { route: Route::Dashboard, .. })
    ));
    assert!(client.session().is_authenticated());
    assert!(client.session().pending_verification().is_none());
}

#[tokio::test]
async fn test_resend_code_respects_cooldown() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let auth = AuthController::new(client_for(&server), fast_ui());
    let start = Instant::now();
    let mut cooldown = ResendCooldown::started(start);

    let update = auth
        .resend_code("alice@example.com", &mut cooldown, start + Duration::from_secs(15))
        .await;
    assert_eq!(first_toast(&update).map(|(level, _)| level), Some(ToastLevel::Warning));
}

#[tokio::test]
async fn test_forgot_password_flow_walks_all_steps() {
    let server = MockServer::start().await;
    for endpoint in ["forgot-password", "verify-otp", "reset-password"] {
        Mock::given(method("POST"))
            .and(path(format!("/api/auth/{}", endpoint)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut flow = ForgotPasswordFlow::new(client_for(&server), fast_ui());
    flow.request_code("alice@example.com").await;
    assert!(matches!(flow.step(), ResetStep::VerifyCode { .. }));

    flow.verify_code("654321").await;
    assert!(matches!(flow.step(), ResetStep::NewPassword { .. }));

    let update = flow.reset_password("newsecret1", "newsecret1").await;
    assert_eq!(flow.step(), &ResetStep::Completed);
    assert!(matches!(
        update.navigation(),
        Some(Route::Login { .. })
    ));
}

// ---------------------------------------------------------------------------
// Analyze
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_analyze_navigates_to_chat_for_new_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/urls/analyze"))
        .respond_with(ResponseTemplate::new(201).set_body_json(record_json("fresh", "Fresh page")))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = AnalyzeController::new(signed_in_client(&server), fast_ui());
    let update = view.submit("https://example.com/fresh").await;

    assert_eq!(
        update.navigation(),
        Some(&Route::Chat { id: "fresh".into() })
    );
    assert_eq!(
        first_toast(&update),
        Some((ToastLevel::Success, "URL analyzed successfully"))
    );
    assert_eq!(view.last_record().map(|r| r.id.as_str()), Some("fresh"));
}

#[tokio::test]
async fn test_analyze_with_expired_session_goes_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/urls/analyze"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut view = AnalyzeController::new(signed_in_client(&server), fast_ui());
    let update = view.submit("https://example.com").await;

    assert_eq!(
        update.navigation(),
        Some(&Route::Login {
            redirect: Some("analyze".into())
        })
    );
    assert_eq!(
        first_toast(&update),
        Some((ToastLevel::Error, SESSION_EXPIRED_NOTICE))
    );
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

async fn mount_records(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            record_json("a", "Alpha"),
            record_json("b", "Beta"),
            record_json("c", "Gamma"),
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_dashboard_delete_removes_record_without_refetch() {
    let server = MockServer::start().await;
    mount_records(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/urls/b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut dashboard = Dashboard::new(signed_in_client(&server), fast_ui());
    dashboard.load().await;
    assert_eq!(dashboard.records().len(), 3);

    let update = dashboard.delete("b").await;

    let ids: Vec<&str> = dashboard.records().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert_eq!(dashboard.visible().len(), 2);
    assert!(!update.reloads());
    assert!(update
        .toasts()
        .any(|t| t.message == "URL deleted successfully"));

    // Only the initial load hit the list endpoint.
    let lists = server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.to_string() == "GET")
        .count();
    assert_eq!(lists, 1);
}

#[tokio::test]
async fn test_dashboard_delete_failure_keeps_record() {
    let server = MockServer::start().await;
    mount_records(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/urls/a"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let mut dashboard = Dashboard::new(signed_in_client(&server), fast_ui());
    dashboard.load().await;
    let update = dashboard.delete("a").await;

    assert_eq!(dashboard.records().len(), 3);
    assert!(update
        .toasts()
        .any(|t| t.level == ToastLevel::Error && t.message == linklens::api::DELETE_EXHAUSTED_MESSAGE));
}

#[tokio::test]
async fn test_dashboard_delete_auth_failure_redirects() {
    let server = MockServer::start().await;
    mount_records(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/urls/a"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in_client(&server);
    let mut dashboard = Dashboard::new(client.clone(), fast_ui());
    dashboard.load().await;
    let update = dashboard.delete("a").await;

    assert_eq!(update.navigation(), Some(&Route::login_then_dashboard()));
    assert!(client.session().credential().is_none());
    assert_eq!(dashboard.records().len(), 3);
}

#[tokio::test]
async fn test_dashboard_search_shows_results() {
    let server = MockServer::start().await;
    mount_records(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/urls/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record_json("c", "Gamma")])))
        .expect(1)
        .mount(&server)
        .await;

    let mut dashboard = Dashboard::new(signed_in_client(&server), fast_ui());
    dashboard.load().await;
    dashboard.search("gamma").await;

    assert_eq!(dashboard.query(), Some("gamma"));
    assert_eq!(dashboard.visible().len(), 1);
    assert_eq!(dashboard.records().len(), 3);

    dashboard.clear_search();
    assert_eq!(dashboard.visible().len(), 3);
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

async fn mount_chat(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/urls/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record_json("a", "Alpha")))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/chat/history/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [
                {"role": "user", "content": "Hi"},
                {"role": "assistant", "content": "Hello"}
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_chat_loads_history_and_answers() {
    let server = MockServer::start().await;
    mount_chat(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/chat/ask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "It is a page"})))
        .mount(&server)
        .await;

    let mut chat = ChatView::new(signed_in_client(&server), fast_ui(), "a");
    chat.load().await;
    assert_eq!(chat.record().map(|r| r.title.as_str()), Some("Alpha"));
    assert_eq!(chat.messages().len(), 2);

    chat.send("What is it?").await;
    let messages = chat.messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2].role, Role::User);
    assert_eq!(messages[3].content, "It is a page");
    assert!(!chat.is_waiting());
}

#[tokio::test]
async fn test_chat_content_too_large_reply() {
    let server = MockServer::start().await;
    mount_chat(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/chat/ask"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Content too large for model"})),
        )
        .mount(&server)
        .await;

    let mut chat = ChatView::new(signed_in_client(&server), fast_ui(), "a");
    chat.load().await;
    chat.send("Summarize everything").await;

    assert_eq!(
        chat.messages().last().map(|m| m.content.as_str()),
        Some(CONTENT_TOO_LARGE_REPLY)
    );
    assert!(chat.content_truncated());
}

#[tokio::test]
async fn test_chat_auth_failure_drops_placeholder() {
    let server = MockServer::start().await;
    mount_chat(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/chat/ask"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let mut chat = ChatView::new(signed_in_client(&server), fast_ui(), "a");
    chat.load().await;
    let update = chat.send("Still there?").await;

    assert_eq!(
        update.navigation(),
        Some(&Route::Login {
            redirect: Some("chat/a".into())
        })
    );
    assert_eq!(chat.messages().len(), 3);
    assert!(!chat.is_waiting());
}

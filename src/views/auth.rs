//! Authentication views: session restore, login, registration, email
//! verification, logout and the password reset flow.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::api::{ApiClient, ApiResponse};
use crate::config::UiConfig;
use crate::models::RegisterRequest;
use crate::session::{PendingVerification, Session};
use crate::validation::{
    validate_email, validate_login, validate_new_password, validate_otp, validate_registration,
    Field, FieldErrors, LoginForm, RegistrationForm,
};

use super::{Route, Toast, ViewEffect, ViewUpdate};

/// Minimum wait between two verification code requests.
pub const RESEND_COOLDOWN: Duration = Duration::from_secs(60);

/// Tracks when another verification code may be requested.
#[derive(Debug, Clone, Default)]
pub struct ResendCooldown {
    available_at: Option<Instant>,
}

impl ResendCooldown {
    /// Cooldown that starts running at `now`, as when a code was just sent.
    pub fn started(now: Instant) -> Self {
        Self {
            available_at: Some(now + RESEND_COOLDOWN),
        }
    }

    /// Time left before a resend is allowed.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.available_at
            .map(|at| at.saturating_duration_since(now))
            .unwrap_or_default()
    }

    /// Cooldown for a code last sent at wall-clock `sent_at`.
    ///
    /// Lets a cooldown carry over between processes. A `sent_at` in the
    /// future counts as just sent.
    pub fn since(sent_at: Option<DateTime<Utc>>, wall_now: DateTime<Utc>, now: Instant) -> Self {
        let Some(sent_at) = sent_at else {
            return Self::default();
        };
        let elapsed = (wall_now - sent_at).to_std().unwrap_or_default();
        match RESEND_COOLDOWN.checked_sub(elapsed) {
            Some(left) if !left.is_zero() => Self {
                available_at: Some(now + left),
            },
            _ => Self::default(),
        }
    }

    pub fn is_ready(&self, now: Instant) -> bool {
        self.remaining(now).is_zero()
    }

    fn restart(&mut self, now: Instant) {
        self.available_at = Some(now + RESEND_COOLDOWN);
    }
}

/// Drives the account pages against the API and the session.
#[derive(Debug, Clone)]
pub struct AuthController {
    api: ApiClient,
    ui: UiConfig,
}

impl AuthController {
    pub fn new(api: ApiClient, ui: UiConfig) -> Self {
        Self { api, ui }
    }

    pub fn session(&self) -> &Session {
        self.api.session()
    }

    /// Load the profile for a persisted credential.
    ///
    /// Fails closed: if the credential cannot be confirmed for any reason
    /// the session is cleared and the user is sent to the home page.
    pub async fn restore(&self) -> ViewUpdate {
        if self.session().credential().is_none() {
            self.session().set_user(None);
            return ViewUpdate::none();
        }

        match self.api.current_user().await {
            ApiResponse::Success(user) => {
                tracing::info!("Restored session for {}", user.username);
                self.session().set_user(Some(user));
                ViewUpdate::none()
            }
            ApiResponse::Failure(failure) => {
                tracing::error!("Error loading user: {}", failure);
                self.session().clear();
                ViewUpdate::none().with(ViewEffect::navigate(Route::Home))
            }
        }
    }

    /// Log in and go to `redirect` (default: the dashboard).
    ///
    /// Any existing credential is dropped before the request. When the
    /// account is not verified yet, nothing is persisted and the user is sent
    /// to the verification page instead.
    pub async fn login(&self, form: &LoginForm, redirect: Option<&str>) -> ViewUpdate {
        if let Err(errors) = validate_login(form) {
            return ViewUpdate::invalid(errors);
        }

        self.session().clear();
        let email = form.email.trim();

        let response = match self.api.login(email, &form.password).await {
            ApiResponse::Success(response) => response,
            ApiResponse::Failure(failure) => {
                let mut update = ViewUpdate::none().with(Toast::error(failure.message.clone()));
                if failure.message.contains("not found") {
                    update.field_errors.add(Field::Email, "User not found");
                }
                return update;
            }
        };

        if response.needs_verification {
            self.session().set_pending_verification(Some(PendingVerification {
                email: email.to_string(),
                username: None,
            }));
            let message = response
                .message
                .unwrap_or_else(|| "Please verify your email".to_string());
            return ViewUpdate::none()
                .with(Toast::info(message))
                .with(ViewEffect::navigate(Route::VerifyEmail {
                    email: email.to_string(),
                }));
        }

        let token = response.token.unwrap_or_default();
        if let Err(e) = self.session().establish(&token, response.user.clone()) {
            tracing::error!("Login failed: {:#}", e);
            return ViewUpdate::none().with(Toast::error("Login failed"));
        }
        if response.user.is_none() {
            self.load_profile().await;
        }

        ViewUpdate::none()
            .with(Toast::success("Login successful! Redirecting..."))
            .with(ViewEffect::navigate(Route::after_login(redirect)))
    }

    /// Create an account; the user then confirms it with an emailed code.
    pub async fn register(&self, form: &RegistrationForm) -> ViewUpdate {
        if let Err(errors) = validate_registration(form) {
            return ViewUpdate::invalid(errors);
        }

        let request = RegisterRequest {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        };

        match self.api.register(&request).await {
            ApiResponse::Success(body) => {
                self.session().set_pending_verification(Some(PendingVerification {
                    email: request.email.clone(),
                    username: Some(request.username.clone()),
                }));
                let message = body.message.unwrap_or_else(|| {
                    "Please verify your email to complete registration".to_string()
                });
                ViewUpdate::none()
                    .with(Toast::info(message))
                    .with(ViewEffect::navigate(Route::VerifyEmail {
                        email: request.email,
                    }))
            }
            ApiResponse::Failure(failure) => {
                let mut update = ViewUpdate::none().with(Toast::error(failure.message.clone()));
                let lowered = failure.message.to_lowercase();
                if lowered.contains("username") {
                    update
                        .field_errors
                        .add(Field::Username, "Username already taken");
                } else if lowered.contains("email") {
                    update
                        .field_errors
                        .add(Field::Email, "Email already registered");
                }
                update
            }
        }
    }

    /// Which address the verification page is for.
    ///
    /// Prefers the address from the route, then the pending verification.
    /// Returns the route to leave for when there is nothing to verify: the
    /// dashboard for a signed-in user, else the registration page.
    pub fn verification_target(&self, email: Option<&str>) -> Result<String, Route> {
        if self.session().is_authenticated() {
            return Err(Route::Dashboard);
        }
        email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .or_else(|| self.session().pending_verification().map(|p| p.email))
            .ok_or(Route::Register)
    }

    /// Confirm the account with the emailed code and sign in.
    pub async fn verify_email(&self, email: &str, code: &str) -> ViewUpdate {
        let code = code.trim();
        if validate_otp(code).is_err() {
            return ViewUpdate::none().with(Toast::error(
                "Please enter all 6 digits of the verification code",
            ));
        }

        match self.api.verify_registration(email, code).await {
            ApiResponse::Success(auth) => {
                if let Err(e) = self.session().establish(&auth.token, Some(auth.user)) {
                    tracing::error!("Verification returned an unusable credential: {:#}", e);
                    return ViewUpdate::none().with(Toast::error("Verification failed"));
                }
                let message = auth
                    .message
                    .unwrap_or_else(|| "Email verified successfully! Redirecting...".to_string());
                ViewUpdate::none()
                    .with(Toast::success(message))
                    .with(ViewEffect::navigate_after(
                        Route::Dashboard,
                        self.ui.verify_redirect_delay(),
                    ))
            }
            ApiResponse::Failure(failure) => {
                ViewUpdate::none().with(Toast::error(failure.message))
            }
        }
    }

    /// Ask for a new verification code, honouring the resend cooldown.
    pub async fn resend_code(
        &self,
        email: &str,
        cooldown: &mut ResendCooldown,
        now: Instant,
    ) -> ViewUpdate {
        if !cooldown.is_ready(now) {
            let seconds = cooldown.remaining(now).as_secs().max(1);
            return ViewUpdate::none().with(Toast::warning(format!(
                "You can request a new code in {} seconds",
                seconds
            )));
        }

        match self.api.resend_verification(email).await {
            ApiResponse::Success(body) => {
                cooldown.restart(now);
                let message = body
                    .message
                    .unwrap_or_else(|| "Verification code resent successfully".to_string());
                ViewUpdate::none().with(Toast::success(message))
            }
            ApiResponse::Failure(failure) => {
                ViewUpdate::none().with(Toast::error(failure.message))
            }
        }
    }

    /// Forget the credential and go home.
    pub fn logout(&self) -> ViewUpdate {
        self.session().clear();
        ViewUpdate::none().with(ViewEffect::navigate(Route::Home))
    }

    async fn load_profile(&self) {
        match self.api.current_user().await {
            ApiResponse::Success(user) => self.session().set_user(Some(user)),
            ApiResponse::Failure(failure) => {
                tracing::warn!("Could not load profile after login: {}", failure)
            }
        }
    }
}

/// Step of the password reset flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetStep {
    /// Waiting for the account email
    RequestCode,
    /// Code sent to `email`
    VerifyCode { email: String },
    /// Code accepted; waiting for the new password
    NewPassword { email: String, otp: String },
    Completed,
}

/// Three-step password reset: email, one-time code, new password.
#[derive(Debug, Clone)]
pub struct ForgotPasswordFlow {
    api: ApiClient,
    ui: UiConfig,
    step: ResetStep,
}

impl ForgotPasswordFlow {
    pub fn new(api: ApiClient, ui: UiConfig) -> Self {
        Self {
            api,
            ui,
            step: ResetStep::RequestCode,
        }
    }

    pub fn step(&self) -> &ResetStep {
        &self.step
    }

    /// Go back to the first step, e.g. to use another address.
    pub fn restart(&mut self) {
        self.step = ResetStep::RequestCode;
    }

    /// Step 1: email a one-time code to `email`.
    pub async fn request_code(&mut self, email: &str) -> ViewUpdate {
        let email = email.trim();
        if let Err(errors) = validate_email(email) {
            return ViewUpdate::invalid(errors);
        }

        match self.api.forgot_password(email).await {
            ApiResponse::Success(_) => {
                self.step = ResetStep::VerifyCode {
                    email: email.to_string(),
                };
                ViewUpdate::none().with(Toast::success("OTP sent to your email"))
            }
            ApiResponse::Failure(failure) => {
                let mut update = ViewUpdate::none().with(Toast::error(failure.message.clone()));
                if failure.message.contains("not found") {
                    update.field_errors.add(Field::Email, "Email not registered");
                }
                update
            }
        }
    }

    /// Step 2: check the code the user received.
    pub async fn verify_code(&mut self, otp: &str) -> ViewUpdate {
        let ResetStep::VerifyCode { email } = &self.step else {
            return out_of_order();
        };
        let email = email.clone();
        let otp = otp.trim();
        if let Err(errors) = validate_otp(otp) {
            return ViewUpdate::invalid(errors);
        }

        match self.api.verify_otp(&email, otp).await {
            ApiResponse::Success(_) => {
                self.step = ResetStep::NewPassword {
                    email,
                    otp: otp.to_string(),
                };
                ViewUpdate::none().with(Toast::success("OTP verified successfully"))
            }
            ApiResponse::Failure(failure) => {
                let mut update = ViewUpdate::none().with(Toast::error(failure.message.clone()));
                if failure.message.to_lowercase().contains("invalid") {
                    update.field_errors.add(Field::Otp, "Invalid OTP");
                }
                update
            }
        }
    }

    /// Step 3: set the new password, then head to the login page.
    pub async fn reset_password(&mut self, new_password: &str, confirm: &str) -> ViewUpdate {
        let ResetStep::NewPassword { email, otp } = &self.step else {
            return out_of_order();
        };
        let (email, otp) = (email.clone(), otp.clone());
        if let Err(errors) = validate_new_password(new_password, confirm) {
            return ViewUpdate::invalid(errors);
        }

        match self.api.reset_password(&email, &otp, new_password).await {
            ApiResponse::Success(_) => {
                self.step = ResetStep::Completed;
                ViewUpdate::none()
                    .with(Toast::success("Password reset successful"))
                    .with(ViewEffect::navigate_after(
                        Route::Login { redirect: None },
                        self.ui.redirect_delay(),
                    ))
            }
            ApiResponse::Failure(failure) => {
                ViewUpdate::none().with(Toast::error(failure.message))
            }
        }
    }
}

fn out_of_order() -> ViewUpdate {
    let mut errors = FieldErrors::new();
    errors.add(Field::Email, "Please request a new code first");
    ViewUpdate::invalid(errors)
}

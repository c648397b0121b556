//! Account endpoints: registration, login, email verification and password
//! reset.
//!
//! These calls do not require a credential. They only talk to the server;
//! persisting the credential they return is the caller's job (see
//! [`crate::views::auth::AuthController`]).

use serde_json::json;

use super::client::{ApiClient, RequestOptions};
use super::outcome::{ApiFailure, ApiResponse};
use crate::models::{AuthResponse, LoginResponse, MessageResponse, RegisterRequest, UserProfile};

const GENERIC_FALLBACK: &str = "An error occurred";

/// Turn a `{success: false, message}` acknowledgement into a failure.
fn require_success(
    response: ApiResponse<MessageResponse>,
    fallback: &str,
) -> ApiResponse<MessageResponse> {
    match response {
        ApiResponse::Success(body) if body.success == Some(false) => {
            let message = body.message.unwrap_or_else(|| fallback.to_string());
            ApiResponse::Failure(ApiFailure::generic(message))
        }
        other => other,
    }
}

impl ApiClient {
    /// `POST /auth/register`. Success means a verification code was emailed.
    pub async fn register(&self, request: &RegisterRequest) -> ApiResponse<MessageResponse> {
        tracing::info!("Registering account for {}", request.email);
        self.post(
            self.endpoint(&["auth", "register"]),
            request,
            RequestOptions::new("Registration failed").anonymous(),
        )
        .await
    }

    /// `POST /auth/verify-registration`. Returns the credential and profile.
    pub async fn verify_registration(&self, email: &str, otp: &str) -> ApiResponse<AuthResponse> {
        tracing::info!("Verifying registration for {}", email);
        self.post(
            self.endpoint(&["auth", "verify-registration"]),
            &json!({ "email": email, "otp": otp }),
            RequestOptions::new("Verification failed").anonymous(),
        )
        .await
    }

    /// `POST /auth/resend-verification`
    pub async fn resend_verification(&self, email: &str) -> ApiResponse<MessageResponse> {
        tracing::info!("Requesting a new verification code for {}", email);
        self.post(
            self.endpoint(&["auth", "resend-verification"]),
            &json!({ "email": email }),
            RequestOptions::new("Failed to resend verification code").anonymous(),
        )
        .await
    }

    /// `POST /auth/login`. The body either carries a credential or asks for
    /// email verification.
    pub async fn login(&self, email: &str, password: &str) -> ApiResponse<LoginResponse> {
        tracing::info!("Logging in as {}", email);
        self.post(
            self.endpoint(&["auth", "login"]),
            &json!({ "email": email, "password": password }),
            RequestOptions::new("Login failed").anonymous(),
        )
        .await
    }

    /// `POST /auth/forgot-password`: email a one-time code.
    pub async fn forgot_password(&self, email: &str) -> ApiResponse<MessageResponse> {
        let response = self
            .post(
                self.endpoint(&["auth", "forgot-password"]),
                &json!({ "email": email }),
                RequestOptions::new(GENERIC_FALLBACK).anonymous(),
            )
            .await;
        require_success(response, "Failed to send OTP")
    }

    /// `POST /auth/verify-otp`
    pub async fn verify_otp(&self, email: &str, otp: &str) -> ApiResponse<MessageResponse> {
        let response = self
            .post(
                self.endpoint(&["auth", "verify-otp"]),
                &json!({ "email": email, "otp": otp }),
                RequestOptions::new(GENERIC_FALLBACK).anonymous(),
            )
            .await;
        require_success(response, "Failed to verify OTP")
    }

    /// `POST /auth/reset-password`
    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> ApiResponse<MessageResponse> {
        let response = self
            .post(
                self.endpoint(&["auth", "reset-password"]),
                &json!({ "email": email, "otp": otp, "newPassword": new_password }),
                RequestOptions::new(GENERIC_FALLBACK).anonymous(),
            )
            .await;
        require_success(response, "Failed to reset password")
    }

    /// `GET /auth/me`: profile of the credential holder.
    pub async fn current_user(&self) -> ApiResponse<UserProfile> {
        self.get(
            self.endpoint(&["auth", "me"]),
            RequestOptions::new("Error loading user"),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_success_passes_through_success() {
        let response = ApiResponse::Success(MessageResponse {
            success: Some(true),
            message: Some("sent".into()),
        });
        assert!(require_success(response, "x").is_success());
    }

    #[test]
    fn test_require_success_missing_flag_is_success() {
        let response = ApiResponse::Success(MessageResponse::default());
        assert!(require_success(response, "x").is_success());
    }

    #[test]
    fn test_require_success_false_uses_server_message() {
        let response = ApiResponse::Success(MessageResponse {
            success: Some(false),
            message: Some("OTP expired".into()),
        });
        assert_eq!(require_success(response, "x").error(), Some("OTP expired"));
    }

    #[test]
    fn test_require_success_false_without_message_uses_fallback() {
        let response = ApiResponse::Success(MessageResponse {
            success: Some(false),
            message: None,
        });
        assert_eq!(
            require_success(response, "Failed to send OTP").error(),
            Some("Failed to send OTP")
        );
    }
}

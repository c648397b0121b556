//! AI chat about an analyzed page.

use serde_json::json;

use super::client::{ApiClient, RequestOptions};
use super::outcome::{ApiFailure, ApiResponse, FailureKind};
use crate::models::{AnswerResponse, ChatHistory};

/// Short explanation for a question the model could not process because the
/// page content exceeds its limits.
pub const CONTENT_TOO_LARGE_MESSAGE: &str =
    "The webpage content is too large for me to process completely.";

/// Whether a server message reports a content-size or token-limit problem.
pub fn is_content_size_message(message: &str) -> bool {
    message.contains("token") || message.contains("too large")
}

/// Re-tag size/token-limit rejections as [`FailureKind::ContentTooLarge`].
///
/// Credential rejections keep their auth tag even if the server message
/// mentions a token.
fn tag_content_size<T>(response: ApiResponse<T>) -> ApiResponse<T> {
    match response {
        ApiResponse::Failure(failure)
            if !failure.is_auth() && is_content_size_message(&failure.message) =>
        {
            tracing::warn!("Chat request hit the content size limit: {}", failure.message);
            ApiResponse::Failure(ApiFailure::new(
                FailureKind::ContentTooLarge,
                CONTENT_TOO_LARGE_MESSAGE,
            ))
        }
        other => other,
    }
}

impl ApiClient {
    /// `POST /chat/ask`: ask a question about the record `url_id`.
    pub async fn ask_question(&self, url_id: &str, question: &str) -> ApiResponse<AnswerResponse> {
        tracing::debug!("Sending chat question for {}", url_id);
        let response = self
            .post(
                self.endpoint(&["chat", "ask"]),
                &json!({ "urlId": url_id, "question": question }),
                RequestOptions::new("Error asking question"),
            )
            .await;
        tag_content_size(response)
    }

    /// `GET /chat/history/:id`
    pub async fn chat_history(&self, url_id: &str) -> ApiResponse<ChatHistory> {
        tracing::debug!("Fetching chat history for {}", url_id);
        self.get(
            self.endpoint(&["chat", "history", url_id]),
            RequestOptions::new("Error fetching chat history"),
        )
        .await
    }
}

//! URL analysis records: analyze, fetch, list, search and delete.

use reqwest::Method;
use serde_json::{json, Value};

use super::client::{ApiClient, RequestOptions};
use super::outcome::{ApiFailure, ApiResponse, Attempt};
use super::retry;
use crate::models::UrlRecord;
use crate::session::token_preview;

/// Result of a delete whose retries were all spent on transient failures.
pub const DELETE_EXHAUSTED_MESSAGE: &str = "Failed to delete URL after multiple attempts";

impl ApiClient {
    /// `POST /urls/analyze`: have the server fetch and summarize `url`.
    pub async fn analyze_url(&self, url: &str) -> ApiResponse<UrlRecord> {
        tracing::info!("Analyzing {}", url);
        self.post(
            self.endpoint(&["urls", "analyze"]),
            &json!({ "url": url }),
            RequestOptions::new("Error analyzing URL"),
        )
        .await
    }

    /// `GET /urls/:id`
    pub async fn get_url(&self, id: &str) -> ApiResponse<UrlRecord> {
        self.get(
            self.endpoint(&["urls", id]),
            RequestOptions::new("Error fetching URL data"),
        )
        .await
    }

    /// `GET /urls`: every record owned by the current user.
    pub async fn list_urls(&self) -> ApiResponse<Vec<UrlRecord>> {
        self.get(
            self.endpoint(&["urls"]),
            RequestOptions::new("Error fetching URLs"),
        )
        .await
    }

    /// `GET /urls/search?query=`
    pub async fn search_urls(&self, query: &str) -> ApiResponse<Vec<UrlRecord>> {
        let mut url = self.endpoint(&["urls", "search"]);
        url.query_pairs_mut().append_pair("query", query);
        self.get(url, RequestOptions::new("Error searching URLs"))
            .await
    }

    /// `DELETE /urls/:id` with bounded retry.
    ///
    /// Server errors and missing responses are retried after a fixed backoff
    /// (by default 2 retries, 1 s apart, 15 s transport timeout per attempt).
    /// 4xx responses are final; 401/403 clears the session and a rejection
    /// without a server message reports its status code. Without a
    /// credential no request is sent at all.
    pub async fn delete_url(&self, id: &str) -> ApiResponse<Value> {
        tracing::info!("Deleting URL record {}", id);
        let url = self.endpoint(&["urls", id]);
        let timeout = self.delete_timeout();

        retry::run(
            self.retry_policy(),
            "Delete URL",
            DELETE_EXHAUSTED_MESSAGE,
            |attempt| {
                let url = url.clone();
                async move {
                    let Some(token) = self.session().credential() else {
                        tracing::error!("No valid token found for delete operation");
                        return Attempt::TerminalFailure(ApiFailure::auth());
                    };
                    tracing::debug!(
                        "Delete attempt #{} with token {}",
                        attempt,
                        token_preview(&token)
                    );
                    self.attempt::<Value, ()>(
                        Method::DELETE,
                        url,
                        None,
                        RequestOptions::new("Error deleting URL")
                            .timeout(timeout)
                            .report_status(),
                    )
                    .await
                }
            },
        )
        .await
    }
}

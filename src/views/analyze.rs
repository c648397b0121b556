//! URL submission page.

use crate::api::{ApiClient, ApiResponse};
use crate::config::UiConfig;
use crate::models::UrlRecord;
use crate::validation::{validate_url, Field};

use super::{session_expired, Route, Toast, ViewEffect, ViewUpdate};

/// Submits URLs for analysis and opens the chat for the new record.
#[derive(Debug, Clone)]
pub struct AnalyzeController {
    api: ApiClient,
    ui: UiConfig,
    last: Option<UrlRecord>,
}

impl AnalyzeController {
    pub fn new(api: ApiClient, ui: UiConfig) -> Self {
        Self { api, ui, last: None }
    }

    /// Record created by the last successful submission.
    pub fn last_record(&self) -> Option<&UrlRecord> {
        self.last.as_ref()
    }

    /// Validate `url` and have the server analyze it.
    pub async fn submit(&mut self, url: &str) -> ViewUpdate {
        // The server receives the URL as typed, not the normalized form.
        let url = match validate_url(url) {
            Ok(_) => url.trim(),
            Err(errors) => {
                let toast = match errors.get(Field::Url) {
                    Some("Please enter a URL") | None => Toast::warning("Please enter a URL"),
                    Some(message) => Toast::error(message),
                };
                return ViewUpdate::invalid(errors).with(toast);
            }
        };

        match self.api.analyze_url(url).await {
            ApiResponse::Success(record) => {
                tracing::info!("Analysis ready: {}", record.id);
                let route = Route::Chat {
                    id: record.id.clone(),
                };
                self.last = Some(record);
                ViewUpdate::none()
                    .with(Toast::success("URL analyzed successfully"))
                    .with(ViewEffect::navigate_after(
                        route,
                        self.ui.analyze_redirect_delay(),
                    ))
            }
            ApiResponse::Failure(failure) if failure.is_auth() => {
                session_expired(&self.ui, Some("analyze"))
            }
            ApiResponse::Failure(failure) => {
                ViewUpdate::none().with(Toast::error(failure.message))
            }
        }
    }
}

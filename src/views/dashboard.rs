//! Dashboard: the user's analyzed URLs with search and delete
//!
//! The dashboard keeps two lists: every record the server returned, and the
//! subset currently shown (search results, or everything when no search is
//! active). A successful delete removes the record from both lists locally
//! instead of refetching.
//!
//! Overlapping searches are fenced with tickets: each search takes the next
//! sequence number and a response is applied only while its ticket is the
//! newest one issued. A slow response to an earlier query can therefore
//! never replace the results of a later one.

use crate::api::{ApiClient, ApiResponse};
use crate::config::UiConfig;
use crate::models::UrlRecord;

use super::{session_expired, Route, Toast, ViewEffect, ViewUpdate};

const DASHBOARD_REDIRECT: &str = "dashboard";

/// Identifies one search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

/// State and actions of the dashboard page.
#[derive(Debug, Clone)]
pub struct Dashboard {
    api: ApiClient,
    ui: UiConfig,
    records: Vec<UrlRecord>,
    visible: Vec<UrlRecord>,
    query: Option<String>,
    latest_search: u64,
    pending_search: Option<SearchTicket>,
}

impl Dashboard {
    pub fn new(api: ApiClient, ui: UiConfig) -> Self {
        Self {
            api,
            ui,
            records: Vec::new(),
            visible: Vec::new(),
            query: None,
            latest_search: 0,
            pending_search: None,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Every record owned by the user
    pub fn records(&self) -> &[UrlRecord] {
        &self.records
    }

    /// Records currently shown
    pub fn visible(&self) -> &[UrlRecord] {
        &self.visible
    }

    /// Active search query, if any
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn is_searching(&self) -> bool {
        self.pending_search.is_some()
    }

    /// Fetch the user's records.
    pub async fn load(&mut self) -> ViewUpdate {
        if self.api.session().credential().is_none() {
            return ViewUpdate::none();
        }

        match self.api.list_urls().await {
            ApiResponse::Success(records) => {
                tracing::debug!("Loaded {} records", records.len());
                self.visible = records.clone();
                self.records = records;
                self.query = None;
                ViewUpdate::none()
            }
            ApiResponse::Failure(failure) if failure.is_auth() => {
                session_expired(&self.ui, Some(DASHBOARD_REDIRECT))
            }
            ApiResponse::Failure(failure) => {
                ViewUpdate::none().with(Toast::error(failure.message))
            }
        }
    }

    /// Start a search for `query`.
    ///
    /// A blank query resets the view to every record and returns `None`:
    /// there is nothing to send. Otherwise the returned ticket must be
    /// handed to [`Dashboard::apply_search`] with the server's answer.
    pub fn begin_search(&mut self, query: &str) -> Option<SearchTicket> {
        let query = query.trim();
        self.latest_search += 1;
        if query.is_empty() {
            self.clear_search();
            return None;
        }
        let ticket = SearchTicket(self.latest_search);
        self.query = Some(query.to_string());
        self.pending_search = Some(ticket);
        Some(ticket)
    }

    /// Apply the response to the search identified by `ticket`.
    ///
    /// Responses to superseded searches are dropped without effects.
    pub fn apply_search(
        &mut self,
        ticket: SearchTicket,
        response: ApiResponse<Vec<UrlRecord>>,
    ) -> ViewUpdate {
        if ticket != SearchTicket(self.latest_search) {
            tracing::debug!(
                "Dropping stale search response #{} (latest #{})",
                ticket.0,
                self.latest_search
            );
            return ViewUpdate::none();
        }
        self.pending_search = None;

        match response {
            ApiResponse::Success(results) => {
                let update = if results.is_empty() {
                    ViewUpdate::none().with(Toast::info(
                        "No URLs found in your collection for this search query",
                    ))
                } else {
                    ViewUpdate::none()
                };
                self.visible = results;
                update
            }
            ApiResponse::Failure(failure) if failure.is_auth() => {
                session_expired(&self.ui, Some(DASHBOARD_REDIRECT))
            }
            ApiResponse::Failure(failure) => {
                ViewUpdate::none().with(Toast::error(failure.message))
            }
        }
    }

    /// Search and apply the result in one go.
    pub async fn search(&mut self, query: &str) -> ViewUpdate {
        let Some(ticket) = self.begin_search(query) else {
            return ViewUpdate::none();
        };
        let response = match &self.query {
            Some(query) => self.api.search_urls(query).await,
            None => return ViewUpdate::none(),
        };
        self.apply_search(ticket, response)
    }

    /// Drop the search and show every record again.
    ///
    /// Any search still in flight is superseded.
    pub fn clear_search(&mut self) {
        self.latest_search += 1;
        self.pending_search = None;
        self.query = None;
        self.visible = self.records.clone();
    }

    /// Delete record `id` and remove it locally on success.
    pub async fn delete(&mut self, id: &str) -> ViewUpdate {
        let id = id.trim();
        if id.is_empty() {
            tracing::error!("Invalid URL ID provided for deletion");
            return ViewUpdate::none().with(Toast::error("Invalid URL ID"));
        }

        if self.api.session().credential().is_none() {
            return ViewUpdate::none()
                .with(Toast::error("You need to be logged in to delete URLs"))
                .with(ViewEffect::navigate_after(
                    Route::login_then_dashboard(),
                    self.ui.redirect_delay(),
                ));
        }

        let mut update = ViewUpdate::none().with(Toast::info("Deleting URL..."));
        match self.api.delete_url(id).await {
            ApiResponse::Success(_) => {
                update.push(Toast::success("URL deleted successfully"));
                if !self.remove_record(id) {
                    tracing::warn!("Deleted record {} was not in local state", id);
                    update.push(Toast::info("Refreshing dashboard..."));
                    update.push(ViewEffect::Reload {
                        delay: self.ui.redirect_delay(),
                    });
                }
            }
            ApiResponse::Failure(failure) if failure.is_auth() => {
                update
                    .effects
                    .extend(session_expired(&self.ui, Some(DASHBOARD_REDIRECT)).effects);
            }
            ApiResponse::Failure(failure) => {
                tracing::error!("Delete failed: {}", failure);
                update.push(Toast::error(failure.message));
            }
        }
        update
    }

    /// Remove `id` from both lists. Returns `false` if it was not loaded.
    fn remove_record(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        self.visible.retain(|record| record.id != id);
        self.records.len() != before
    }
}

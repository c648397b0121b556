//! Authenticated HTTP client wrapper
//!
//! [`ApiClient`] attaches the session credential to each request, runs the
//! shared classifier over every response and clears the session as soon as
//! the server rejects the credential. The domain façade (`auth`, `urls`,
//! `chat`) is implemented as further `impl ApiClient` blocks on top of
//! [`ApiClient::call`] and [`ApiClient::attempt`].

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::outcome::{ApiFailure, ApiResponse, Attempt};
use super::retry::RetryPolicy;
use crate::config::Config;
use crate::error::{LinklensError, Result};
use crate::session::Session;

/// Per-call settings.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RequestOptions<'a> {
    /// Message used when the server supplies none
    pub fallback: &'a str,
    /// Overrides the client-wide timeout
    pub timeout: Option<Duration>,
    /// Endpoint does not require identity (`/auth/*`): an auth rejection
    /// keeps the server's own message, e.g. "Invalid credentials".
    pub anonymous: bool,
    /// A rejection without a server message reports the HTTP status
    /// instead of `fallback`.
    pub report_status: bool,
}

impl<'a> RequestOptions<'a> {
    pub fn new(fallback: &'a str) -> Self {
        Self {
            fallback,
            timeout: None,
            anonymous: false,
            report_status: false,
        }
    }

    pub fn report_status(mut self) -> Self {
        self.report_status = true;
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Client for the URL analyzer API.
///
/// # Examples
///
/// ```no_run
/// use linklens::api::ApiClient;
/// use linklens::config::Config;
/// use linklens::session::Session;
///
/// # async fn example() -> linklens::error::Result<()> {
/// let client = ApiClient::new(&Config::default(), Session::in_memory())?;
/// let records = client.list_urls().await;
/// if let Some(records) = records.data() {
///     println!("{} records", records.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
    retry: RetryPolicy,
    delete_timeout: Duration,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be constructed.
    pub fn new(config: &Config, session: Session) -> Result<Self> {
        let base_url = Url::parse(&config.api.base_url).map_err(LinklensError::Url)?;
        if base_url.cannot_be_a_base() {
            return Err(LinklensError::Config(format!(
                "api.base_url cannot be used as a base: {}",
                base_url
            ))
            .into());
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("linklens/", env!("CARGO_PKG_VERSION")));
        if let Some(seconds) = config.api.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let http = builder.build().map_err(LinklensError::Http)?;

        Ok(Self {
            http,
            base_url,
            session,
            retry: RetryPolicy::from(&config.retry),
            delete_timeout: config.api.delete_timeout(),
        })
    }

    /// Replace the retry policy used by retrying calls.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub(crate) fn delete_timeout(&self) -> Duration {
        self.delete_timeout
    }

    /// Append path segments to the base URL, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base URL can always carry path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Perform one request and classify the outcome.
    ///
    /// A credential rejection clears the session before returning.
    pub(crate) async fn attempt<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        options: RequestOptions<'_>,
    ) -> Attempt<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method.clone(), url.clone());
        match self.session.credential() {
            Some(token) => request = request.bearer_auth(token),
            None => tracing::debug!("No credential available for {} {}", method, url.path()),
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("{} {} failed without a response: {}", method, url.path(), e);
                return Attempt::RetryableFailure(ApiFailure::network(options.fallback));
            }
        };

        let status = response.status();
        tracing::debug!("{} {} -> {}", method, url.path(), status);

        let body = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to read response body from {}: {}", url.path(), e);
                return Attempt::RetryableFailure(ApiFailure::network(options.fallback));
            }
        };

        let status_message;
        let fallback = if options.report_status {
            status_message = format!("Server returned status {}", status.as_u16());
            status_message.as_str()
        } else {
            options.fallback
        };
        let attempt = super::outcome::classify(status, &body, fallback);

        if let Attempt::TerminalFailure(failure) = &attempt {
            if failure.is_auth() {
                tracing::warn!("{} {} rejected the credential ({})", method, url.path(), status);
                self.session.clear();
                if options.anonymous {
                    if let Some(message) = super::outcome::server_message(&body) {
                        return Attempt::TerminalFailure(ApiFailure::new(failure.kind, message));
                    }
                }
            } else {
                tracing::error!("{} {} failed: {}", method, url.path(), failure);
            }
        }

        attempt
    }

    /// Perform one request and normalize it for the caller.
    pub(crate) async fn call<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        options: RequestOptions<'_>,
    ) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.attempt(method, url, body, options).await.into()
    }

    /// GET without a request body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        options: RequestOptions<'_>,
    ) -> ApiResponse<T> {
        self.call::<T, ()>(Method::GET, url, None, options).await
    }

    /// POST a JSON body.
    pub(crate) async fn post<T, B>(
        &self,
        url: Url,
        body: &B,
        options: RequestOptions<'_>,
    ) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(Method::POST, url, Some(body), options).await
    }
}

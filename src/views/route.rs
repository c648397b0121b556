//! Navigation targets of the front-end.

use std::fmt;

use url::form_urlencoded;

/// A page the front-end can navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    /// Login page, optionally returning to `redirect` (a path without the
    /// leading slash, e.g. `dashboard`) afterwards
    Login { redirect: Option<String> },
    Register,
    /// Email verification for `email`
    VerifyEmail { email: String },
    ForgotPassword,
    Analyze,
    Dashboard,
    /// Chat about the URL record `id`
    Chat { id: String },
    NotFound,
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

impl Route {
    /// Login page that returns to the dashboard.
    pub fn login_then_dashboard() -> Self {
        Self::Login {
            redirect: Some("dashboard".to_string()),
        }
    }

    /// Path with query string, e.g. `/verify-email?email=a%40b.co`.
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login { redirect: None } => "/login".to_string(),
            Self::Login {
                redirect: Some(target),
            } => format!("/login?redirect={}", encode(target)),
            Self::Register => "/register".to_string(),
            Self::VerifyEmail { email } => format!("/verify-email?email={}", encode(email)),
            Self::ForgotPassword => "/forgot-password".to_string(),
            Self::Analyze => "/analyze".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Chat { id } => format!("/chat/{}", id),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// Resolve a path (with optional query string) to a route.
    ///
    /// Unknown paths resolve to [`Route::NotFound`].
    pub fn parse(path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, query),
            None => (path, ""),
        };
        let param = |name: &str| {
            form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
                .filter(|value| !value.is_empty())
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login {
                redirect: param("redirect"),
            },
            ["register"] => Self::Register,
            ["verify-email"] => match param("email") {
                Some(email) => Self::VerifyEmail { email },
                None => Self::Register,
            },
            ["forgot-password"] => Self::ForgotPassword,
            ["analyze"] => Self::Analyze,
            ["dashboard"] => Self::Dashboard,
            ["chat", id] => Self::Chat { id: id.to_string() },
            _ => Self::NotFound,
        }
    }

    /// Where a login should land: the `redirect` target, else the dashboard.
    pub fn after_login(redirect: Option<&str>) -> Self {
        match redirect.map(str::trim).filter(|r| !r.is_empty()) {
            Some(target) => match Self::parse(&format!("/{}", target.trim_start_matches('/'))) {
                Self::NotFound | Self::Login { .. } => Self::Dashboard,
                route => route,
            },
            None => Self::Dashboard,
        }
    }

    /// Whether the page requires a signed-in user.
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Analyze | Self::Dashboard | Self::Chat { .. })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

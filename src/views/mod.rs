//! Headless view layer
//!
//! Controllers call the API façade, update their own state and describe what
//! the front-end should do next as [`ViewEffect`]s: navigate (possibly after
//! a delay), show a toast, or reload the page. They never render anything
//! themselves, which keeps them testable without a terminal.
//!
//! - [`auth`]: session restore, login, registration, verification,
//!   password reset, logout
//! - [`analyze`]: URL submission
//! - [`dashboard`]: record list, search, delete with optimistic update
//! - [`chat`]: conversation about one record

use std::time::Duration;

use crate::config::UiConfig;
use crate::validation::FieldErrors;

pub mod analyze;
pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod route;
pub mod toast;

pub use route::Route;
pub use toast::{Toast, ToastCenter, ToastLevel};

/// Message shown before redirecting a user whose credential was rejected.
pub const SESSION_EXPIRED_NOTICE: &str = "Your session has expired. Please log in again.";

/// Something the front-end should do in response to a view action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEffect {
    /// Go to `route` once `delay` has elapsed
    Navigate { route: Route, delay: Duration },
    /// Show a notification
    Toast(Toast),
    /// Reload the current page once `delay` has elapsed
    Reload { delay: Duration },
}

impl ViewEffect {
    pub fn navigate(route: Route) -> Self {
        Self::Navigate {
            route,
            delay: Duration::ZERO,
        }
    }

    pub fn navigate_after(route: Route, delay: Duration) -> Self {
        Self::Navigate { route, delay }
    }
}

impl From<Toast> for ViewEffect {
    fn from(toast: Toast) -> Self {
        Self::Toast(toast)
    }
}

/// Result of a view action: effects plus inline field errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewUpdate {
    pub effects: Vec<ViewEffect>,
    pub field_errors: FieldErrors,
}

impl ViewUpdate {
    pub fn none() -> Self {
        Self::default()
    }

    /// Validation failed; nothing was sent.
    pub fn invalid(field_errors: FieldErrors) -> Self {
        Self {
            effects: Vec::new(),
            field_errors,
        }
    }

    pub fn with(mut self, effect: impl Into<ViewEffect>) -> Self {
        self.effects.push(effect.into());
        self
    }

    pub fn push(&mut self, effect: impl Into<ViewEffect>) {
        self.effects.push(effect.into());
    }

    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }

    /// First navigation target, if any.
    pub fn navigation(&self) -> Option<&Route> {
        self.effects.iter().find_map(|effect| match effect {
            ViewEffect::Navigate { route, .. } => Some(route),
            _ => None,
        })
    }

    pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
        self.effects.iter().filter_map(|effect| match effect {
            ViewEffect::Toast(toast) => Some(toast),
            _ => None,
        })
    }

    pub fn reloads(&self) -> bool {
        self.effects
            .iter()
            .any(|effect| matches!(effect, ViewEffect::Reload { .. }))
    }
}

/// Toast plus delayed redirect to login, used after a credential rejection.
///
/// The API layer has already cleared the session by the time this runs.
pub(crate) fn session_expired(ui: &UiConfig, redirect: Option<&str>) -> ViewUpdate {
    ViewUpdate::none()
        .with(Toast::error(SESSION_EXPIRED_NOTICE))
        .with(ViewEffect::navigate_after(
            Route::Login {
                redirect: redirect.map(str::to_string),
            },
            ui.redirect_delay(),
        ))
}

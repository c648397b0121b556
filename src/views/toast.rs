//! Transient, auto-expiring notifications
//!
//! [`ToastCenter`] keeps the currently visible toasts. Each toast expires
//! after its duration unless it was pushed as sticky; it can also be
//! dismissed early by id.

use std::time::{Duration, Instant};

use colored::Colorize;
use uuid::Uuid;

/// Default lifetime of a toast.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(5000);

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Info,
    Warning,
}

impl ToastLevel {
    /// Colored label for terminal output
    pub fn colored_tag(&self) -> String {
        match self {
            Self::Success => format!("[{}]", "OK".green()),
            Self::Error => format!("[{}]", "ERROR".red()),
            Self::Info => format!("[{}]", "INFO".cyan()),
            Self::Warning => format!("[{}]", "WARN".yellow()),
        }
    }
}

/// A notification requested by a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn new(level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Warning, message)
    }

    /// Single terminal line
    pub fn render(&self) -> String {
        format!("{} {}", self.level.colored_tag(), self.message)
    }
}

/// A toast currently on screen.
#[derive(Debug, Clone)]
pub struct ActiveToast {
    pub id: Uuid,
    pub toast: Toast,
    /// `None` for sticky toasts
    pub expires_at: Option<Instant>,
}

/// Holds visible toasts and expires them.
#[derive(Debug, Clone)]
pub struct ToastCenter {
    default_duration: Duration,
    toasts: Vec<ActiveToast>,
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl ToastCenter {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            default_duration,
            toasts: Vec::new(),
        }
    }

    /// Show `toast` for the default duration.
    pub fn push(&mut self, toast: Toast) -> Uuid {
        self.push_at(toast, Some(self.default_duration), Instant::now())
    }

    /// Show `toast` until dismissed.
    pub fn push_sticky(&mut self, toast: Toast) -> Uuid {
        self.push_at(toast, None, Instant::now())
    }

    /// Show `toast` for `duration` starting at `now`.
    pub fn push_at(&mut self, toast: Toast, duration: Option<Duration>, now: Instant) -> Uuid {
        let id = Uuid::new_v4();
        self.toasts.push(ActiveToast {
            id,
            toast,
            expires_at: duration.map(|d| now + d),
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> Uuid {
        self.push(Toast::success(message))
    }

    pub fn error(&mut self, message: impl Into<String>) -> Uuid {
        self.push(Toast::error(message))
    }

    pub fn info(&mut self, message: impl Into<String>) -> Uuid {
        self.push(Toast::info(message))
    }

    pub fn warning(&mut self, message: impl Into<String>) -> Uuid {
        self.push(Toast::warning(message))
    }

    /// Remove a toast before it expires. Returns whether it was visible.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Drop expired toasts and return the remaining ones, oldest first.
    pub fn active(&mut self, now: Instant) -> &[ActiveToast] {
        self.toasts
            .retain(|t| t.expires_at.map_or(true, |expires| expires > now));
        &self.toasts
    }

    /// Remove and return every toast, e.g. to print them once.
    pub fn drain(&mut self) -> Vec<ActiveToast> {
        std::mem::take(&mut self.toasts)
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

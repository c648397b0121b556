//! Application-scoped session context
//!
//! [`Session`] owns the bearer credential and the signed-in user's profile.
//! The credential is persisted through a [`CredentialStore`]; the persisted
//! value is authoritative and is re-read before every outgoing request, so a
//! logout performed by another process is picked up on the next call.
//!
//! Views that depend on authentication state subscribe through
//! [`Session::subscribe`] and receive a fresh [`SessionSnapshot`] whenever the
//! token, profile or pending verification changes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::config::{SessionBackend, SessionConfig};
use crate::error::{LinklensError, Result};
use crate::models::UserProfile;

pub mod store;

pub use store::{
    CredentialStore, FileCredentialStore, KeyringCredentialStore, MemoryCredentialStore,
};

/// Storage key under which the bearer credential is persisted.
pub const TOKEN_KEY: &str = "token";

fn code_sent_key(email: &str) -> String {
    format!("code_sent_at:{}", email.trim().to_lowercase())
}

/// Returns `true` when `value` can be sent as a bearer credential.
///
/// Empty values and the literal strings `"undefined"` and `"null"` (left
/// behind by clients that stored a missing value verbatim) are treated as
/// absent.
pub fn is_usable_token(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed != "undefined" && trimmed != "null"
}

/// Short, log-safe prefix of a credential.
pub fn token_preview(token: &str) -> String {
    let prefix: String = token.chars().take(10).collect();
    format!("{}...", prefix)
}

/// Registration or login awaiting email verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVerification {
    pub email: String,
    pub username: Option<String>,
}

/// Point-in-time view of the session published to subscribers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub pending_verification: Option<PendingVerification>,
}

impl SessionSnapshot {
    /// A user counts as authenticated once their profile is loaded.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Debug)]
struct SessionInner {
    store: Arc<dyn CredentialStore>,
    state: watch::Sender<SessionSnapshot>,
}

/// Shared session handle. Clones refer to the same session.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Create a session over `store`, seeding the in-memory token from it.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        let session = Self {
            inner: Arc::new(SessionInner { store, state }),
        };
        session.credential();
        session
    }

    /// Session backed by a process-local store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCredentialStore::new()))
    }

    /// Build the session described by the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the default data directory cannot be resolved.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let store: Arc<dyn CredentialStore> = match config.backend {
            SessionBackend::File => match &config.path {
                Some(path) => Arc::new(FileCredentialStore::new(path)),
                None => Arc::new(FileCredentialStore::in_data_dir()?),
            },
            SessionBackend::Keyring => Arc::new(KeyringCredentialStore::new()),
        };
        tracing::debug!("Session store: {:?}", store);
        Ok(Self::new(store))
    }

    /// Read the credential to attach to the next request.
    ///
    /// The persisted value wins over the in-memory copy. Unusable values are
    /// removed from storage and reported as `None`. Storage read failures are
    /// logged and also reported as `None`.
    pub fn credential(&self) -> Option<String> {
        let persisted = match self.inner.store.get(TOKEN_KEY) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to read stored credential: {:#}", e);
                None
            }
        };

        let token = match persisted {
            Some(value) if is_usable_token(&value) => Some(value),
            Some(garbage) => {
                tracing::debug!("Discarding unusable stored credential {:?}", garbage);
                if let Err(e) = self.inner.store.remove(TOKEN_KEY) {
                    tracing::warn!("Failed to remove unusable credential: {:#}", e);
                }
                None
            }
            None => None,
        };

        self.inner.state.send_if_modified(|snapshot| {
            if snapshot.token == token {
                return false;
            }
            tracing::debug!("Session token reconciled from storage");
            snapshot.token = token.clone();
            if snapshot.token.is_none() {
                snapshot.user = None;
            }
            true
        });

        token
    }

    /// Persist a freshly issued credential and the matching profile.
    ///
    /// Storage is written before the in-memory state so that a request
    /// issued right after this call already carries the new credential.
    ///
    /// # Errors
    ///
    /// Returns [`LinklensError::Session`] when the server handed back an
    /// unusable token, or a storage error if persisting fails.
    pub fn establish(&self, token: &str, user: Option<UserProfile>) -> Result<()> {
        if !is_usable_token(token) {
            return Err(LinklensError::Session("Server returned invalid token".into()).into());
        }

        self.inner.store.set(TOKEN_KEY, token)?;
        tracing::info!("Credential saved: {}", token_preview(token));

        self.inner.state.send_modify(|snapshot| {
            snapshot.token = Some(token.to_string());
            if user.is_some() {
                snapshot.user = user;
            }
            snapshot.pending_verification = None;
        });
        Ok(())
    }

    /// Forget the credential, profile and any pending verification.
    ///
    /// Never fails: a storage error is logged and the in-memory state is
    /// cleared regardless.
    pub fn clear(&self) {
        if let Err(e) = self.inner.store.remove(TOKEN_KEY) {
            tracing::warn!("Failed to remove stored credential: {:#}", e);
        }
        self.inner.state.send_if_modified(|snapshot| {
            let changed = *snapshot != SessionSnapshot::default();
            *snapshot = SessionSnapshot::default();
            changed
        });
        tracing::info!("Session cleared");
    }

    /// Replace the cached profile.
    pub fn set_user(&self, user: Option<UserProfile>) {
        self.inner.state.send_if_modified(|snapshot| {
            if snapshot.user == user {
                return false;
            }
            snapshot.user = user;
            true
        });
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.inner.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn set_pending_verification(&self, pending: Option<PendingVerification>) {
        self.inner.state.send_modify(|snapshot| {
            snapshot.pending_verification = pending;
        });
    }

    pub fn pending_verification(&self) -> Option<PendingVerification> {
        self.inner.state.borrow().pending_verification.clone()
    }

    /// When a verification code was last requested for `email`.
    ///
    /// Unreadable or malformed entries count as never.
    pub fn code_sent_at(&self, email: &str) -> Option<DateTime<Utc>> {
        let value = match self.inner.store.get(&code_sent_key(email)) {
            Ok(value) => value?,
            Err(e) => {
                tracing::warn!("Failed to read resend time: {:#}", e);
                return None;
            }
        };
        DateTime::parse_from_rfc3339(&value)
            .map(|at| at.with_timezone(&Utc))
            .ok()
    }

    /// Remember that a verification code was sent to `email` at `at`.
    pub fn record_code_sent(&self, email: &str, at: DateTime<Utc>) {
        if let Err(e) = self.inner.store.set(&code_sent_key(email), &at.to_rfc3339()) {
            tracing::warn!("Failed to persist resend time: {:#}", e);
        }
    }

    /// Current snapshot without touching storage.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Receive a notification each time the session changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            created_at: None,
            plan: None,
            status: None,
        }
    }

    #[test]
    fn test_is_usable_token() {
        assert!(is_usable_token("eyJhbGciOi"));
        assert!(!is_usable_token(""));
        assert!(!is_usable_token("   "));
        assert!(!is_usable_token("undefined"));
        assert!(!is_usable_token("null"));
    }

    #[test]
    fn test_token_preview_is_short() {
        assert_eq!(token_preview("abcdefghijklmnop"), "abcdefghij...");
        assert_eq!(token_preview("abc"), "abc...");
    }

    #[test]
    fn test_credential_absent() {
        let session = Session::in_memory();
        assert_eq!(session.credential(), None);
    }

    #[test]
    fn test_garbage_credentials_are_absent_and_removed() {
        for garbage in ["undefined", "null", ""] {
            let store = Arc::new(MemoryCredentialStore::new());
            store.set(TOKEN_KEY, garbage).unwrap();
            let session = Session::new(store.clone());

            assert_eq!(session.credential(), None, "value {:?}", garbage);
            assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        }
    }

    #[test]
    fn test_persisted_value_is_authoritative() {
        let store = Arc::new(MemoryCredentialStore::new());
        let session = Session::new(store.clone());
        session.establish("first-token", Some(profile("ada"))).unwrap();

        // Another writer replaced the persisted value.
        store.set(TOKEN_KEY, "second-token").unwrap();
        assert_eq!(session.credential().as_deref(), Some("second-token"));
        assert_eq!(session.snapshot().token.as_deref(), Some("second-token"));

        // And another removed it.
        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(session.credential(), None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_establish_rejects_unusable_token() {
        let session = Session::in_memory();
        let err = session.establish("undefined", None).unwrap_err();
        assert!(err.to_string().contains("invalid token"));
        assert_eq!(session.credential(), None);
    }

    #[test]
    fn test_establish_clears_pending_verification() {
        let session = Session::in_memory();
        session.set_pending_verification(Some(PendingVerification {
            email: "ada@example.com".into(),
            username: Some("ada".into()),
        }));
        session.establish("tok-123", Some(profile("ada"))).unwrap();

        assert!(session.pending_verification().is_none());
        assert!(session.is_authenticated());
        assert_eq!(session.credential().as_deref(), Some("tok-123"));
    }

    #[test]
    fn test_clear_removes_everything() {
        let store = Arc::new(MemoryCredentialStore::new());
        let session = Session::new(store.clone());
        session.establish("tok-123", Some(profile("ada"))).unwrap();

        session.clear();

        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(session.snapshot(), SessionSnapshot::default());
    }

    #[test]
    fn test_new_session_seeds_token_from_store() {
        let store = Arc::new(MemoryCredentialStore::new());
        store.set(TOKEN_KEY, "persisted").unwrap();
        let session = Session::new(store);
        assert_eq!(session.snapshot().token.as_deref(), Some("persisted"));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let session = Session::in_memory();
        let mut rx = session.subscribe();

        session.establish("tok-abc", Some(profile("ada"))).unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated());

        session.clear();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_authenticated());
    }

    #[test]
    fn test_code_sent_time_is_persisted_per_email() {
        let store = Arc::new(MemoryCredentialStore::new());
        let session = Session::new(store.clone());
        let at = Utc::now();
        session.record_code_sent("Ada@Example.com", at);

        let other = Session::new(store.clone());
        let read = other.code_sent_at("ada@example.com").unwrap();
        assert_eq!(read.timestamp(), at.timestamp());
        assert!(other.code_sent_at("bob@example.com").is_none());

        store.set(&code_sent_key("bob@example.com"), "yesterday").unwrap();
        assert!(other.code_sent_at("bob@example.com").is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let session = Session::in_memory();
        let other = session.clone();
        session.establish("shared", Some(profile("ada"))).unwrap();
        assert_eq!(other.user().map(|u| u.username), Some("ada".to_string()));
    }
}

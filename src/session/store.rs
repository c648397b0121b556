//! Persistent key-value storage for the session credential
//!
//! [`CredentialStore`] is the persisted, authoritative side of the session:
//! the in-memory copy held by [`super::Session`] is reconciled against it
//! before every outgoing request. Three backends are provided:
//!
//! - [`FileCredentialStore`] -- a small JSON object on disk (default)
//! - [`KeyringCredentialStore`] -- the OS native credential store
//! - [`MemoryCredentialStore`] -- process-local, used by tests and
//!   ephemeral sessions

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use directories::ProjectDirs;

use crate::error::{LinklensError, Result};

/// Key-value persistence used by the session.
///
/// Implementations must treat removal of a missing key as a no-op.
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`, `Ok(None)` when absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`.
    fn remove(&self, key: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FileCredentialStore
// ---------------------------------------------------------------------------

/// JSON-file backed store.
///
/// The file holds a flat JSON object of string values. A missing file reads
/// as an empty store; the file and its parent directory are created on the
/// first write.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Create a store backed by `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create a store in the platform data directory (`session.json`).
    ///
    /// # Errors
    ///
    /// Returns [`LinklensError::Session`] if the data directory cannot be
    /// determined.
    pub fn in_data_dir() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "linklens", "linklens")
            .ok_or_else(|| LinklensError::Session("Could not determine data directory".into()))?;
        Ok(Self::new(proj_dirs.data_dir().join("session.json")))
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let values = serde_json::from_str(&contents)
            .with_context(|| format!("Malformed session file {}", self.path.display()))?;
        Ok(values)
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for session file")?;
        }
        let json = serde_json::to_string_pretty(values)?;
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&self.path)
            .with_context(|| format!("Failed to open session file {}", self.path.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write session file {}", self.path.display()))?;
        // The mode above only applies to newly created files.
        set_file_mode_600(&self.path)?;
        Ok(())
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        // A poisoned lock only means another writer panicked; the file itself
        // is still the source of truth.
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.guard();
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.guard();
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.guard();
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

/// The session file holds a bearer credential: owner read/write only.
#[cfg(unix)]
fn set_file_mode_600(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to chmod 600: {}", path.display()))
}

#[cfg(not(unix))]
fn set_file_mode_600(_path: &Path) -> Result<()> {
    Ok(())
}

// ---------------------------------------------------------------------------
// KeyringCredentialStore
// ---------------------------------------------------------------------------

/// Store backed by the OS native keyring (Keychain, Secret Service,
/// Windows Credential Manager).
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    service: String,
}

impl KeyringCredentialStore {
    /// Default keyring service name.
    pub const SERVICE: &'static str = "linklens-session";

    pub fn new() -> Self {
        Self::with_service(Self::SERVICE)
    }

    /// Use a custom service name, e.g. to keep test entries apart.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, key).map_err(|e| LinklensError::Keyring(e).into())
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(LinklensError::Keyring(e).into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(LinklensError::Keyring)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(LinklensError::Keyring(e).into()),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryCredentialStore
// ---------------------------------------------------------------------------

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values().remove(key);
        Ok(())
    }
}

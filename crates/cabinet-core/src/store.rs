//! Persisted key-value storage and the token store built on it.
//!
//! The file-backed store keeps a flat JSON object at
//! `${CABINET_HOME}/storage.json` with restricted permissions (0600).
//! Tokens are never logged in full.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};

use crate::api::types::User;
use crate::config::paths;

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "auth_token";
/// Storage key of the JSON-serialized user record.
pub const USER_KEY: &str = "user";

/// String key-value storage that survives (or not) process restarts.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value. Missing keys and unreadable storage both yield `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes several entries in one step.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be written.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()>;

    /// Deletes several keys in one step. Missing keys are ignored.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be written.
    fn remove_many(&self, keys: &[&str]) -> Result<()>;
}

/// In-process storage, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut map = self.lock();
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.lock();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// JSON-file storage.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location under the cabinet home.
    pub fn default_location() -> Self {
        Self::new(paths::storage_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read storage from {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse storage from {}", self.path.display()))
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(entries).context("Failed to serialize storage")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.load() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "storage unreadable");
                None
            }
        }
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        // A corrupt file is replaced rather than blocking every future write.
        let mut map = self.load().unwrap_or_default();
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        self.save(&map)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.load().unwrap_or_default();
        let before = map.len();
        for key in keys {
            map.remove(*key);
        }
        if map.len() == before {
            return Ok(());
        }
        self.save(&map)
    }
}

/// Bearer token and last-known user, always read and written as a pair.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

impl TokenStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// Token store over the default file location.
    pub fn file_backed() -> Self {
        Self::new(Arc::new(FileStore::default_location()))
    }

    /// Token store that forgets everything on exit.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Persists the token and user together.
    ///
    /// # Errors
    /// Returns an error if the user cannot be serialized or storage fails.
    pub fn save(&self, token: &str, user: &User) -> Result<()> {
        let user_json = serde_json::to_string(user).context("Failed to serialize user")?;
        self.inner
            .set_many(&[(TOKEN_KEY, token), (USER_KEY, &user_json)])
    }

    /// Replaces the stored user, keeping the token.
    ///
    /// # Errors
    /// Returns an error if the user cannot be serialized or storage fails.
    pub fn save_user(&self, user: &User) -> Result<()> {
        let user_json = serde_json::to_string(user).context("Failed to serialize user")?;
        self.inner.set_many(&[(USER_KEY, &user_json)])
    }

    pub fn token(&self) -> Option<String> {
        self.inner.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Stored user; `None` if absent or not valid JSON.
    pub fn user(&self) -> Option<User> {
        let raw = self.inner.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "stored user record is not valid JSON");
                None
            }
        }
    }

    /// Erases both entries.
    ///
    /// # Errors
    /// Returns an error if storage cannot be written.
    pub fn clear(&self) -> Result<()> {
        self.inner.remove_many(&[TOKEN_KEY, USER_KEY])
    }
}

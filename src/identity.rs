//! Identity preferences
//!
//! The current user identity and the recently-used list are caller-visible
//! state, not ambient globals: the gateway receives the identity explicitly
//! on every call, and persistence goes through the [`PreferenceStore`] port
//! so hosts can decide where (or whether) preferences live.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// How many recently-used identities are retained
pub const MAX_RECENT_USERS: usize = 5;

/// Persisted identity preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// The identity used for upstream calls
    pub current_user: String,

    /// Most-recently-selected identities, newest first
    #[serde(default)]
    pub recent_users: Vec<String>,
}

impl Preferences {
    /// Preferences for an identity with no selection history
    pub fn new(default_user: &str) -> Self {
        Self {
            current_user: default_user.to_string(),
            recent_users: Vec::new(),
        }
    }

    /// Select an identity, promoting it to the front of the recent list
    ///
    /// Rejects empty (post-trim) identities before any state changes.
    pub fn select_user(&mut self, raw: &str) -> Result<()> {
        let user = raw.trim();
        if user.is_empty() {
            return Err(Error::Validation(
                "user identity must not be empty".to_string(),
            ));
        }

        self.current_user = user.to_string();
        self.recent_users.retain(|u| u != user);
        self.recent_users.insert(0, user.to_string());
        self.recent_users.truncate(MAX_RECENT_USERS);
        Ok(())
    }

    /// Identities offered for quick selection: recents first, then the
    /// configured common list, then the current identity, deduplicated in
    /// that order
    pub fn quick_select(&self, common_users: &[String]) -> Vec<String> {
        let mut seen = Vec::new();
        for user in self
            .recent_users
            .iter()
            .chain(common_users.iter())
            .chain(std::iter::once(&self.current_user))
        {
            if !seen.contains(user) {
                seen.push(user.clone());
            }
        }
        seen
    }
}

/// Persistence port for identity preferences
pub trait PreferenceStore: Send + Sync {
    /// Load persisted preferences; None when nothing usable is stored
    fn load(&self) -> Result<Option<Preferences>>;

    /// Persist preferences
    fn save(&self, preferences: &Preferences) -> Result<()>;
}

/// JSON-file-backed preference store
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    /// Create a store over an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The platform default preference file location
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|dir| dir.join("membridge").join("preferences.json"))
    }

    /// The file this store reads and writes
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<Option<Preferences>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(Error::Io(err)),
        };

        match serde_json::from_str(&content) {
            Ok(preferences) => Ok(Some(preferences)),
            Err(err) => {
                // A corrupt file is equivalent to no stored preferences
                tracing::warn!(
                    "ignoring unreadable preference file {}: {}",
                    self.path.display(),
                    err
                );
                Ok(None)
            }
        }
    }

    fn save(&self, preferences: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write-then-rename so a crash never leaves a truncated file
        let temp = self
            .path
            .with_extension(format!("tmp-{}", uuid::Uuid::new_v4()));
        std::fs::write(&temp, serde_json::to_vec_pretty(preferences)?)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

/// In-memory preference store for embedding and tests
#[derive(Default)]
pub struct MemoryPreferenceStore {
    inner: Mutex<Option<Preferences>>,
}

impl MemoryPreferenceStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Option<Preferences>> {
        let guard = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.clone())
    }

    fn save(&self, preferences: &Preferences) -> Result<()> {
        let mut guard = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(preferences.clone());
        Ok(())
    }
}

//! Client-side configuration and persisted session.
//!
//! Reads/writes `~/.agripac/config.toml`. The path is passed explicitly at
//! every call site so tests can point it at a temp directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::session::Role;

/// Cached user profile, written at login time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

/// Persisted session: tokens plus the cached profile.
///
/// Presence of a token does not guarantee validity — any request may still
/// come back 401, which surfaces as an ordinary error prompting re-login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_token: String,
    pub user: StoredUser,
}

/// Client configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL (e.g. "https://agripac.example.it").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,

    /// Current session, if logged in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<StoredSession>,
}

impl ClientConfig {
    /// Default config file path: ~/.agripac/config.toml.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".agripac").join("config.toml")
    }

    /// Load config from disk, or return default if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Storage(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| ApiError::Storage(format!("{}: {}", path.display(), e)))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ApiError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ApiError::Storage(format!("{}: {}", parent.display(), e)))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| ApiError::Storage(format!("{}: {}", path.display(), e)))
    }

    /// Access token of the current session, if any.
    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }

    /// Role of the logged-in user, if any.
    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().map(|s| s.user.role)
    }

    /// Drop the whole session table. Purely client-side: the backend keeps
    /// no session state to revoke.
    pub fn clear_session(&mut self) {
        self.session = None;
    }
}

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use super::tokens::AuthTokens;
use crate::error::{NavigatorError, NavigatorResult};
use crate::models::UserRole;

/// Everything kept between runs: tokens, the guest flag and a locally chosen role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub tokens: Option<AuthTokens>,
    #[serde(default)]
    pub guest: bool,
    #[serde(default)]
    pub role: Option<UserRole>,
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> NavigatorResult<StoredSession>;

    fn save(&self, session: &StoredSession) -> NavigatorResult<()>;

    fn clear(&self) -> NavigatorResult<()>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<StoredSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: StoredSession) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> NavigatorResult<StoredSession> {
        self.inner
            .lock()
            .map(|s| s.clone())
            .map_err(|e| NavigatorError::Internal(e.to_string()))
    }

    fn save(&self, session: &StoredSession) -> NavigatorResult<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| NavigatorError::Internal(e.to_string()))?;
        *guard = session.clone();
        Ok(())
    }

    fn clear(&self) -> NavigatorResult<()> {
        self.save(&StoredSession::default())
    }
}

/// JSON file store, by default `<config_dir>/navigator/session.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> NavigatorResult<StoredSession> {
        if !self.path.exists() {
            return Ok(StoredSession::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(StoredSession::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, session: &StoredSession) -> NavigatorResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        write_private(&self.path, content.as_bytes())?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    fn clear(&self) -> NavigatorResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            debug!(path = %self.path.display(), "Session cleared");
        }
        Ok(())
    }
}

/// Writes through a sibling file created owner-only, then renames it into place.
fn write_private(path: &Path, content: &[u8]) -> NavigatorResult<()> {
    let staging = path.with_extension("tmp");
    if staging.exists() {
        std::fs::remove_file(&staging)?;
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&staging)?;
    file.write_all(content)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&staging, path)?;
    Ok(())
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

use crate::types::{AuthUser, Token};

use super::state::Session;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session record: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Durable record of a session: the access token, its expiry and the user.
///
/// Written and removed as one document so the three values never diverge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub access_token_expiry: Option<DateTime<Utc>>,
    pub user: AuthUser,
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            access_token: session.access_token.value.clone(),
            access_token_expiry: session.access_token.expire_at,
            user: session.user.clone(),
        }
    }
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Session {
            access_token: Token::new(stored.access_token, stored.access_token_expiry),
            user: stored.user,
        }
    }
}

/// Durable key/value backend for the session group
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<StoredSession>, StorageError>;
    fn save(&self, session: &StoredSession) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// Process-local storage, used by tests and embedders that persist elsewhere
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<StoredSession>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: StoredSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<StoredSession>, StorageError> {
        Ok(self.slot.lock().map_err(|_| StorageError::Poisoned)?.clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), StorageError> {
        *self.slot.lock().map_err(|_| StorageError::Poisoned)? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot.lock().map_err(|_| StorageError::Poisoned)? = None;
        Ok(())
    }
}

/// Write a file only the current user can read. Existing files are
/// narrowed to owner-only as well.
pub(crate) fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents)?;
    file.sync_all()
}

/// JSON file storage; saves go through a temp file and a rename
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<StoredSession>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let session: StoredSession = serde_json::from_str(&content)?;
        Ok(Some(session))
    }

    fn save(&self, session: &StoredSession) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(session)?;
        write_private(&tmp, content.as_bytes())?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

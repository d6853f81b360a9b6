use std::sync::{Arc, RwLock};

use crate::error::{ClientError, RefreshFailure};
use crate::types::{AuthUser, Token};

use super::storage::{SessionStorage, StoredSession};

/// An authenticated session: the bearer token and the user it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: Token,
    pub user: AuthUser,
}

/// Process-wide owner of the current session.
///
/// Token and user live in one `Option<Session>`, so they are set and
/// cleared together. Every mutation is written through to durable storage
/// while the write lock is held.
pub struct SessionState {
    current: RwLock<Option<Session>>,
    storage: Arc<dyn SessionStorage>,
}

impl SessionState {
    /// Restore whatever session the storage holds.
    ///
    /// A corrupt record is discarded rather than failing startup.
    pub fn restore(storage: Arc<dyn SessionStorage>) -> Self {
        let current = match storage.load() {
            Ok(stored) => stored.map(Session::from),
            Err(e) => {
                tracing::warn!("Discarding unreadable stored session: {}", e);
                if let Err(e) = storage.clear() {
                    tracing::error!("Failed to clear session storage: {}", e);
                }
                None
            }
        };

        Self {
            current: RwLock::new(current),
            storage,
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.access_token.value.clone())
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.read().as_ref().map(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Install a freshly granted session (login, registration, MFA, OAuth)
    pub fn establish(&self, access_token: Token, user: AuthUser) -> Result<(), ClientError> {
        let session = Session { access_token, user };
        let mut current = self.write();
        self.storage.save(&StoredSession::from(&session))?;
        *current = Some(session);
        Ok(())
    }

    /// Swap in a refreshed token, and the user when the server sent one.
    ///
    /// With no existing session a user is required to keep token and user paired.
    pub(crate) fn apply_refresh(&self, access_token: Token, user: Option<AuthUser>) -> Result<(), RefreshFailure> {
        let mut current = self.write();
        let user = match (user, current.as_ref()) {
            (Some(user), _) => user,
            (None, Some(existing)) => existing.user.clone(),
            (None, None) => return Err(RefreshFailure::MissingUser),
        };

        let session = Session { access_token, user };
        self.storage
            .save(&StoredSession::from(&session))
            .map_err(|e| RefreshFailure::Storage(e.to_string()))?;
        *current = Some(session);
        Ok(())
    }

    /// Overwrite the user with the server's copy; the token is untouched
    pub fn replace_user(&self, user: AuthUser) -> Result<(), ClientError> {
        let mut current = self.write();
        let session = match current.as_ref() {
            Some(existing) => Session {
                access_token: existing.access_token.clone(),
                user,
            },
            None => return Err(ClientError::validation("Not signed in.")),
        };

        self.storage.save(&StoredSession::from(&session))?;
        *current = Some(session);
        Ok(())
    }

    /// Drop the session from memory and storage
    pub fn clear(&self) {
        let mut current = self.write();
        *current = None;
        if let Err(e) = self.storage.clear() {
            tracing::error!("Failed to clear session storage: {}", e);
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Session>> {
        self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

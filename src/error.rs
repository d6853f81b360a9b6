// Client error types
use serde::Deserialize;
use thiserror::Error;

use crate::session::storage::StorageError;

/// Errors surfaced by every client operation
#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response carrying the server message (or `HTTP <status>`)
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Refresh failed, or the retried request was rejected again
    #[error("Session expired. Please sign in again.")]
    SessionExpired,

    #[error("Invalid refresh: {0}")]
    InvalidRefresh(#[from] RefreshFailure),

    /// An auth workflow answered 2xx but did not grant a session
    #[error("{0}")]
    AuthRejected(String),

    /// Local precondition failure, raised before any network call
    #[error("{0}")]
    Validation(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Why a token refresh did not produce a new access token.
///
/// Cloneable so a single refresh outcome can be handed to every caller
/// awaiting the shared in-flight refresh.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefreshFailure {
    #[error("refresh endpoint rejected the request: {0}")]
    Rejected(String),

    #[error("refresh response carried no access token")]
    MissingToken,

    #[error("refresh response carried no user and no session exists")]
    MissingUser,

    #[error("refresh request failed: {0}")]
    Transport(String),

    #[error("could not persist refreshed session: {0}")]
    Storage(String),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    /// HTTP status for server-side failures
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the caller should route the user back to sign-in
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::SessionExpired | ClientError::InvalidRefresh(_))
    }

    /// Build an API error from a failed response body.
    ///
    /// Uses `message`, then `error`, then falls back to `HTTP <status>`.
    pub(crate) fn from_response_body(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status));

        ClientError::Api { status, message }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub type ClientResult<T> = Result<T, ClientError>;

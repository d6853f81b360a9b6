use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bearer credential plus its advertised expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub value: String,
    #[serde(default, deserialize_with = "super::lenient_timestamp")]
    pub expire_at: Option<DateTime<Utc>>,
}

impl Token {
    pub fn new(value: impl Into<String>, expire_at: Option<DateTime<Utc>>) -> Self {
        Self {
            value: value.into(),
            expire_at,
        }
    }

    /// Expired per the advertised expiry; unknown expiry is never expired
    pub fn is_expired(&self) -> bool {
        self.expire_at.map(|at| at <= Utc::now()).unwrap_or(false)
    }
}

/// The signed-in user's own profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub email_validated: bool,
    #[serde(default)]
    pub spotify_linked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthStatus {
    Success,
    MfaRequired,
    #[serde(other)]
    Failure,
}

/// Which flow an emailed verification code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MfaContext {
    Login,
    Register,
}

impl MfaContext {
    /// Endpoint that confirms a code for this flow
    pub fn validation_path(&self) -> &'static str {
        match self {
            MfaContext::Login => "/auth/validateCodeLogin",
            MfaContext::Register => "/auth/validateEmail",
        }
    }
}

/// Response of every credential-based auth endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub status: AuthStatus,
    #[serde(default)]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub context_info: Option<String>,
    #[serde(default)]
    pub access_token: Option<Token>,
    #[serde(default)]
    pub refresh_token: Option<Token>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthResponse {
    /// Token and user when the response grants a session
    pub fn into_grant(self) -> Result<(Token, AuthUser), Option<String>> {
        match (self.status, self.access_token, self.user) {
            (AuthStatus::Success, Some(token), Some(user)) if !token.value.is_empty() => Ok((token, user)),
            _ => Err(self.message),
        }
    }
}

/// Response of `/auth/refreshToken`; the refresh token itself stays in the cookie
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<Token>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

/// Partial profile update; absent fields are left untouched by the server
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// `Some(None)` clears the image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.username.is_none() && self.bio.is_none() && self.image_url.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

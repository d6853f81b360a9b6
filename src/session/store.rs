use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::services::{AuthService, UserService};
use crate::types::{AuthResponse, AuthStatus, AuthUser, MfaContext, UpdateProfileRequest};

use super::state::SessionState;

/// An emailed-code challenge waiting for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChallenge {
    pub email: String,
    pub context: MfaContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    MfaPending { email: String, context: MfaContext },
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(AuthUser),
    /// A code was emailed; finish with `validate_code`
    MfaRequired { email: String },
}

/// Authentication state machine over the shared session.
///
/// Transitions:
/// - `Unauthenticated -> MfaPending` when login or register asks for a code
/// - `Unauthenticated | MfaPending -> Authenticated` on a granted session
/// - any state `-> Unauthenticated` on logout or a failed refresh
pub struct SessionStore {
    client: ApiClient,
    session: Arc<SessionState>,
    auth: AuthService,
    users: UserService,
    pending: Mutex<Option<PendingChallenge>>,
}

impl SessionStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            session: client.session().clone(),
            auth: AuthService::new(client.clone()),
            users: UserService::new(client.clone()),
            client,
            pending: Mutex::new(None),
        }
    }

    pub fn state(&self) -> AuthState {
        if self.session.is_authenticated() {
            return AuthState::Authenticated;
        }
        match self.pending().as_ref() {
            Some(challenge) => AuthState::MfaPending {
                email: challenge.email.clone(),
                context: challenge.context,
            },
            None => AuthState::Unauthenticated,
        }
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.session.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn pending_challenge(&self) -> Option<PendingChallenge> {
        self.pending().clone()
    }

    /// Continue a challenge started elsewhere, e.g. by an earlier CLI run
    pub fn resume_challenge(&self, challenge: PendingChallenge) {
        *self.pending() = Some(challenge);
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginOutcome> {
        let response = self.auth.login(email, password).await?;
        self.handle_response(response, email, MfaContext::Login, "Login failed.")
    }

    pub async fn register(&self, name: &str, username: &str, email: &str, password: &str) -> ClientResult<LoginOutcome> {
        let response = self.auth.register(name, username, email, password).await?;
        self.handle_response(response, email, MfaContext::Register, "Registration failed.")
    }

    /// Submit the emailed code for the pending challenge
    pub async fn validate_code(&self, code: &str) -> ClientResult<AuthUser> {
        let challenge = self
            .pending_challenge()
            .ok_or_else(|| ClientError::validation("No verification is pending."))?;
        let code = code.trim();
        if code.is_empty() {
            return Err(ClientError::validation("Verification code is required."));
        }

        let response = self.auth.validate_code(challenge.context, &challenge.email, code).await?;
        let user = self.grant(response, "Invalid verification code.")?;
        tracing::info!("Verified {} for {}", code_flow(challenge.context), challenge.email);
        Ok(user)
    }

    pub async fn resend_code(&self) -> ClientResult<()> {
        let challenge = self
            .pending_challenge()
            .ok_or_else(|| ClientError::validation("No verification is pending."))?;
        self.auth.resend_code(challenge.context, &challenge.email).await
    }

    pub async fn login_with_google(&self, id_token: &str) -> ClientResult<AuthUser> {
        let response = self.auth.login_google(id_token).await?;
        self.grant(response, "Google sign-in failed.")
    }

    pub async fn login_with_spotify(&self, code: &str, redirect_uri: &str, code_verifier: &str) -> ClientResult<AuthUser> {
        let response = self.auth.login_spotify(code, redirect_uri, code_verifier).await?;
        self.grant(response, "Spotify sign-in failed.")
    }

    /// Proactive refresh; any failure ends the session
    pub async fn refresh(&self) -> ClientResult<()> {
        match self.client.refresh().await {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::warn!("Proactive refresh failed: {}", e);
                self.session.clear();
                Err(ClientError::SessionExpired)
            }
        }
    }

    pub async fn reset_password(&self, email: &str) -> ClientResult<Option<String>> {
        Ok(self.auth.reset_password(email).await?.message)
    }

    pub async fn change_password(&self, new_password: &str, token: &str) -> ClientResult<()> {
        self.auth.change_password(new_password, token).await
    }

    /// Send the changed fields and keep whatever the server returns
    pub async fn update_profile(&self, fields: &UpdateProfileRequest) -> ClientResult<AuthUser> {
        if !self.session.is_authenticated() {
            return Err(ClientError::validation("Not signed in."));
        }

        let user = self.users.update_me(fields).await?;
        self.session.replace_user(user.clone())?;
        Ok(user)
    }

    pub async fn reload_profile(&self) -> ClientResult<AuthUser> {
        let user = self.users.me().await?;
        self.session.replace_user(user.clone())?;
        Ok(user)
    }

    /// Local only; the server keeps the refresh cookie until it expires
    pub fn logout(&self) {
        self.pending().take();
        self.session.clear();
    }

    fn handle_response(
        &self,
        response: AuthResponse,
        email: &str,
        context: MfaContext,
        fallback: &str,
    ) -> ClientResult<LoginOutcome> {
        if response.status == AuthStatus::MfaRequired {
            *self.pending() = Some(PendingChallenge {
                email: email.to_string(),
                context,
            });
            tracing::info!("Verification code sent to {}", email);
            return Ok(LoginOutcome::MfaRequired {
                email: email.to_string(),
            });
        }

        self.grant(response, fallback).map(LoginOutcome::Authenticated)
    }

    /// Install the session a response grants, or reject with its message
    fn grant(&self, response: AuthResponse, fallback: &str) -> ClientResult<AuthUser> {
        let (token, user) = response
            .into_grant()
            .map_err(|message| ClientError::AuthRejected(message.unwrap_or_else(|| fallback.to_string())))?;

        self.session.establish(token, user.clone())?;
        self.pending().take();
        Ok(user)
    }

    fn pending(&self) -> MutexGuard<'_, Option<PendingChallenge>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn code_flow(context: MfaContext) -> &'static str {
    match context {
        MfaContext::Login => "login code",
        MfaContext::Register => "email",
    }
}

//! Spotify authorization-code flow with PKCE.
//!
//! The front end sends the user to [`SpotifyAuthorization::url`], keeps the
//! state and verifier until the redirect comes back, then exchanges the
//! code through `SessionStore::login_with_spotify`.
//!
//! Google sign-in hands over an ID token from Google's own SDK; only its
//! audience is checked here before it is sent on.

pub mod pkce;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::OAuthConfig;
use crate::error::{ClientError, ClientResult};

/// A started authorization: where to send the user and what to remember
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyAuthorization {
    pub url: String,
    pub state: String,
    pub code_verifier: String,
    pub redirect_uri: String,
}

impl SpotifyAuthorization {
    pub fn start(config: &OAuthConfig) -> ClientResult<Self> {
        if config.spotify_client_id.trim().is_empty() {
            return Err(ClientError::validation("Spotify client id is not configured."));
        }

        let state = pkce::generate_state();
        let code_verifier = pkce::generate_code_verifier();
        let challenge = pkce::code_challenge(&code_verifier);

        let mut url = Url::parse(&config.spotify_authorize_url)?;
        url.query_pairs_mut()
            .append_pair("client_id", &config.spotify_client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &config.spotify_redirect_uri)
            .append_pair("code_challenge_method", "S256")
            .append_pair("code_challenge", &challenge)
            .append_pair("state", &state)
            .append_pair("scope", &config.spotify_scopes.join(" "));

        Ok(Self {
            url: url.into(),
            state,
            code_verifier,
            redirect_uri: config.spotify_redirect_uri.clone(),
        })
    }

    /// Check the `state` echoed on the redirect before exchanging the code
    pub fn verify_state(&self, returned: &str) -> ClientResult<()> {
        if returned != self.state {
            return Err(ClientError::validation("OAuth state mismatch; restart the sign-in."));
        }
        Ok(())
    }
}

/// Pull `code` and `state` out of the redirect URL the provider sent back.
///
/// An `error` parameter (user denied access) becomes an `AuthRejected`.
pub fn parse_callback(redirect: &str) -> ClientResult<(String, String)> {
    let url = Url::parse(redirect)?;
    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => return Err(ClientError::AuthRejected(format!("Spotify sign-in failed: {}", value))),
            _ => {}
        }
    }

    match (code, state) {
        (Some(code), Some(state)) => Ok((code, state)),
        _ => Err(ClientError::validation("Redirect URL is missing code or state.")),
    }
}

/// Reject a Google ID token minted for a different client id.
///
/// Skipped when no Google client id is configured. The signature is the
/// backend's job; this only reads the `aud` claim.
pub fn check_google_audience(config: &OAuthConfig, id_token: &str) -> ClientResult<()> {
    let expected = config.google_client_id.trim();
    if expected.is_empty() {
        return Ok(());
    }

    let audiences = google_audiences(id_token).ok_or_else(|| ClientError::validation("Not a Google ID token."))?;
    if !audiences.iter().any(|aud| aud == expected) {
        tracing::warn!("Google ID token audience {:?} does not match {}", audiences, expected);
        return Err(ClientError::validation("Google ID token was issued for another application."));
    }
    Ok(())
}

fn google_audiences(id_token: &str) -> Option<Vec<String>> {
    let payload = id_token.trim().split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    match &claims["aud"] {
        serde_json::Value::String(aud) => Some(vec![aud.clone()]),
        serde_json::Value::Array(list) => Some(list.iter().filter_map(|a| a.as_str().map(str::to_string)).collect()),
        _ => None,
    }
}

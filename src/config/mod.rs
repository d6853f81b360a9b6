use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub oauth: OAuthConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend root; relative request paths are appended to it
    pub base_url: String,
    /// Value of the `X-Client-Type` header sent on every request
    pub client_type: String,
    pub request_timeout_secs: u64,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub spotify_client_id: String,
    pub spotify_redirect_uri: String,
    pub spotify_authorize_url: String,
    pub spotify_scopes: Vec<String>,
    pub google_client_id: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("SALBUM_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    /// Config pointing at an explicit backend, other fields from development defaults.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::development();
        config.api.base_url = base_url.into();
        config
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("SALBUM_API_BASE_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("SALBUM_CLIENT_TYPE") {
            if !v.trim().is_empty() {
                self.api.client_type = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("SALBUM_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }
        if let Ok(v) = env::var("SALBUM_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // OAuth overrides
        if let Ok(v) = env::var("SALBUM_SPOTIFY_CLIENT_ID") {
            self.oauth.spotify_client_id = v;
        }
        if let Ok(v) = env::var("SALBUM_SPOTIFY_REDIRECT_URI") {
            self.oauth.spotify_redirect_uri = v;
        }
        if let Ok(v) = env::var("SALBUM_SPOTIFY_SCOPES") {
            self.oauth.spotify_scopes = v.split_whitespace().map(|s| s.to_string()).collect();
        }
        if let Ok(v) = env::var("SALBUM_GOOGLE_CLIENT_ID") {
            self.oauth.google_client_id = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                client_type: "web".to_string(),
                request_timeout_secs: 30,
                enable_request_logging: true,
            },
            oauth: OAuthConfig::with_redirect("http://localhost:5173/auth/callback/spotify"),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://api.staging.salbum.app".to_string(),
                client_type: "web".to_string(),
                request_timeout_secs: 15,
                enable_request_logging: true,
            },
            oauth: OAuthConfig::with_redirect("https://staging.salbum.app/auth/callback/spotify"),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://api.salbum.app".to_string(),
                client_type: "web".to_string(),
                request_timeout_secs: 10,
                enable_request_logging: false,
            },
            oauth: OAuthConfig::with_redirect("https://salbum.app/auth/callback/spotify"),
        }
    }
}

impl OAuthConfig {
    fn with_redirect(spotify_redirect_uri: &str) -> Self {
        Self {
            spotify_client_id: String::new(),
            spotify_redirect_uri: spotify_redirect_uri.to_string(),
            spotify_authorize_url: "https://accounts.spotify.com/authorize".to_string(),
            spotify_scopes: vec![
                "user-read-email".to_string(),
                "user-read-private".to_string(),
                "user-read-recently-played".to_string(),
            ],
            google_client_id: String::new(),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<ClientConfig> = Lazy::new(ClientConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static ClientConfig {
    &CONFIG
}

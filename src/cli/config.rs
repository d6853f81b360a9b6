use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::cookie::{CookieStore, Jar};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::api::REFRESH_PATH;
use crate::app::AppContext;
use crate::config::ClientConfig;
use crate::oauth::SpotifyAuthorization;
use crate::session::storage::write_private;
use crate::session::{FileStorage, PendingChallenge};

const SESSION_FILE: &str = "session.json";
const COOKIE_FILE: &str = "cookies.json";
const MFA_FILE: &str = "mfa.json";
const SPOTIFY_FILE: &str = "oauth_spotify.json";

/// Refresh cookie as captured from the jar, keyed by the backend it belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCookies {
    pub base_url: String,
    /// `name=value; name2=value2` as the jar would send it
    pub header: String,
    pub saved_at: DateTime<Utc>,
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("SALBUM_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("salbum").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    write_private(path, content.as_bytes())?;
    Ok(())
}

fn remove_file(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

fn refresh_url(base_url: &str) -> anyhow::Result<Url> {
    Ok(Url::parse(&format!("{}{}", base_url.trim_end_matches('/'), REFRESH_PATH))?)
}

/// Rebuild a cookie jar from the cookies saved for this backend
pub fn load_cookie_jar(dir: &Path, base_url: &str) -> anyhow::Result<Arc<Jar>> {
    let jar = Jar::default();
    if let Some(saved) = load_json::<SavedCookies>(&dir.join(COOKIE_FILE))? {
        if saved.base_url == base_url {
            let url = refresh_url(base_url)?;
            for cookie in saved.header.split(';').map(str::trim).filter(|c| !c.is_empty()) {
                jar.add_cookie_str(&format!("{}; Path=/", cookie), &url);
            }
        } else {
            tracing::debug!("Ignoring cookies saved for {}", saved.base_url);
        }
    }
    Ok(Arc::new(jar))
}

/// Write whatever the jar would send to the refresh endpoint
pub fn save_cookie_jar(dir: &Path, base_url: &str, jar: &Jar) -> anyhow::Result<()> {
    let path = dir.join(COOKIE_FILE);
    match jar.cookies(&refresh_url(base_url)?) {
        Some(header) => save_json(
            &path,
            &SavedCookies {
                base_url: base_url.to_string(),
                header: header.to_str()?.to_string(),
                saved_at: Utc::now(),
            },
        ),
        None => remove_file(&path),
    }
}

pub fn load_spotify_authorization() -> anyhow::Result<Option<SpotifyAuthorization>> {
    load_json(&get_config_dir()?.join(SPOTIFY_FILE))
}

pub fn save_spotify_authorization(auth: &SpotifyAuthorization) -> anyhow::Result<()> {
    save_json(&get_config_dir()?.join(SPOTIFY_FILE), auth)
}

pub fn clear_spotify_authorization() -> anyhow::Result<()> {
    remove_file(&get_config_dir()?.join(SPOTIFY_FILE))
}

/// One CLI invocation's view of the persisted client state.
///
/// `open` restores session, refresh cookie and any pending code challenge;
/// `save` writes back what changed.
pub struct CliSession {
    pub app: AppContext,
    jar: Arc<Jar>,
    dir: PathBuf,
    signed_out: AtomicBool,
}

impl CliSession {
    pub fn open() -> anyhow::Result<Self> {
        let dir = get_config_dir()?;
        let config: ClientConfig = crate::config::config().clone();

        let storage = Arc::new(FileStorage::new(dir.join(SESSION_FILE)));
        let jar = load_cookie_jar(&dir, &config.api.base_url)?;
        let app = AppContext::with_cookie_jar(config, storage, jar.clone())?;

        if let Some(challenge) = load_json::<PendingChallenge>(&dir.join(MFA_FILE))? {
            app.auth.resume_challenge(challenge);
        }

        Ok(Self {
            app,
            jar,
            dir,
            signed_out: AtomicBool::new(false),
        })
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if self.signed_out.load(Ordering::SeqCst) {
            remove_file(&self.dir.join(COOKIE_FILE))?;
        } else {
            save_cookie_jar(&self.dir, &self.app.config.api.base_url, &self.jar)?;
        }

        let mfa = self.dir.join(MFA_FILE);
        match self.app.auth.pending_challenge() {
            Some(challenge) => save_json(&mfa, &challenge),
            None => remove_file(&mfa),
        }
    }

    /// Drop the saved refresh cookie when this invocation ends
    pub fn forget_cookies(&self) {
        self.signed_out.store(true, Ordering::SeqCst);
    }
}

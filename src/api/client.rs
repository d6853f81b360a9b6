use futures::FutureExt;
use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult, RefreshFailure};
use crate::session::SessionState;
use crate::types::TokenResponse;

use super::refresh::{RefreshGate, RefreshOutcome};

pub const CLIENT_TYPE_HEADER: &str = "X-Client-Type";
pub const REFRESH_PATH: &str = "/auth/refreshToken";

/// Per-request options
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    /// Send without a bearer token and never refresh on 401 (auth endpoints)
    pub skip_auth: bool,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            skip_auth: false,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ClientResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }
}

/// Outcome of one network attempt
enum Attempt {
    Complete(reqwest::Response),
    /// 401 on an authenticated request; a refresh may recover it
    NeedsRefresh,
}

/// Authenticated HTTP client for the backend API.
///
/// Cheap to clone; all clones share the cookie jar, the session and the
/// in-flight refresh.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    client_type: String,
    log_requests: bool,
    session: Arc<SessionState>,
    refresh: Arc<RefreshGate>,
}

pub struct ApiClientBuilder {
    config: ApiConfig,
    session: Arc<SessionState>,
    cookie_jar: Option<Arc<Jar>>,
}

impl ApiClientBuilder {
    /// Share a cookie jar with the caller (to persist the refresh cookie)
    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    pub fn build(self) -> ClientResult<ApiClient> {
        Url::parse(&self.config.base_url)?;

        let jar = self.cookie_jar.unwrap_or_default();
        let http = reqwest::Client::builder()
            .cookie_provider(jar)
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .build()?;

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                base_url: self.config.base_url.trim_end_matches('/').to_string(),
                client_type: self.config.client_type,
                log_requests: self.config.enable_request_logging,
                session: self.session,
                refresh: Arc::new(RefreshGate::new()),
            }),
        })
    }
}

impl ApiClient {
    pub fn builder(config: &ApiConfig, session: Arc<SessionState>) -> ApiClientBuilder {
        ApiClientBuilder {
            config: config.clone(),
            session,
            cookie_jar: None,
        }
    }

    pub fn new(config: &ApiConfig, session: Arc<SessionState>) -> ClientResult<Self> {
        Self::builder(config, session).build()
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.inner.session
    }

    /// Underlying HTTP client, for requests outside the API (presigned uploads)
    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Resolve a relative path against the base URL; absolute URLs pass through
    pub fn url(&self, path: &str) -> ClientResult<Url> {
        self.inner.join(path).map_err(Into::into)
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_pending()
    }

    /// Issue a request and decode the JSON body.
    ///
    /// An empty body decodes as `null`, so `()` and `Option<T>` accept 204s.
    pub async fn request<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> ClientResult<T> {
        let body = self.dispatch(path, &options).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_slice(b"null")?);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    /// Issue a request and discard whatever body comes back
    pub async fn execute(&self, path: &str, options: RequestOptions) -> ClientResult<()> {
        self.dispatch(path, &options).await.map(|_| ())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(path, RequestOptions::get()).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(path, RequestOptions::post().json(body)?).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(path, RequestOptions::put().json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.execute(path, RequestOptions::delete()).await
    }

    /// Exchange the refresh cookie for a new access token.
    ///
    /// Joins a refresh already in flight instead of starting another. On
    /// failure the session has been cleared.
    pub async fn refresh(&self) -> ClientResult<String> {
        self.refresh_shared().await.map_err(ClientError::from)
    }

    async fn refresh_shared(&self) -> RefreshOutcome {
        let inner = Arc::clone(&self.inner);
        let (future, started) = self
            .inner
            .refresh
            .join_or_start(move || inner.perform_refresh().boxed());

        if started {
            tracing::debug!("Started token refresh");
        } else {
            tracing::debug!("Joined in-flight token refresh");
        }

        future.await
    }

    /// Send with auth, recover one 401 through a refresh, and check the status
    async fn dispatch(&self, path: &str, options: &RequestOptions) -> ClientResult<Vec<u8>> {
        let url = self.url(path)?;
        let token = if options.skip_auth {
            None
        } else {
            self.inner.session.access_token()
        };

        let response = match self.attempt(&url, options, token.as_deref()).await? {
            Attempt::Complete(response) => response,
            Attempt::NeedsRefresh => {
                tracing::warn!("401 from {} {}, refreshing access token", options.method, path);

                let token = match self.refresh_shared().await {
                    Ok(token) => token,
                    Err(e) => {
                        tracing::error!("Token refresh failed: {}", e);
                        self.inner.session.clear();
                        return Err(ClientError::SessionExpired);
                    }
                };

                tracing::info!("Token refreshed, retrying {} {}", options.method, path);
                match self.attempt(&url, options, Some(&token)).await? {
                    Attempt::Complete(response) => response,
                    Attempt::NeedsRefresh => {
                        tracing::error!("{} {} still unauthorized after refresh", options.method, path);
                        self.inner.session.clear();
                        return Err(ClientError::SessionExpired);
                    }
                }
            }
        };

        let status = response.status();
        let body = response.bytes().await?.to_vec();
        if !status.is_success() {
            return Err(ClientError::from_response_body(status.as_u16(), &body));
        }

        Ok(body)
    }

    async fn attempt(&self, url: &Url, options: &RequestOptions, token: Option<&str>) -> ClientResult<Attempt> {
        if self.inner.log_requests {
            tracing::debug!("{} {}", options.method, url);
        }

        let mut builder = self.inner.headers(self.inner.http.request(options.method.clone(), url.clone()));
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &options.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED && !options.skip_auth {
            return Ok(Attempt::NeedsRefresh);
        }

        Ok(Attempt::Complete(response))
    }
}

impl ClientInner {
    fn join(&self, path: &str) -> Result<Url, url::ParseError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Url::parse(path);
        }

        if path.starts_with('/') {
            Url::parse(&format!("{}{}", self.base_url, path))
        } else {
            Url::parse(&format!("{}/{}", self.base_url, path))
        }
    }

    fn headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header(CONTENT_TYPE, "application/json")
            .header(CLIENT_TYPE_HEADER, self.client_type.as_str())
    }

    async fn perform_refresh(self: Arc<Self>) -> RefreshOutcome {
        let outcome = self.exchange_refresh_cookie().await;
        match &outcome {
            Ok(_) => tracing::info!("Access token refreshed"),
            Err(e) => {
                tracing::error!("Refresh rejected: {}", e);
                self.session.clear();
            }
        }
        outcome
    }

    /// POST the refresh endpoint; the server reads the HttpOnly cookie
    async fn exchange_refresh_cookie(&self) -> RefreshOutcome {
        let url = self
            .join(REFRESH_PATH)
            .map_err(|e| RefreshFailure::Transport(e.to_string()))?;

        let response = self
            .headers(self.http.post(url))
            .body("{}")
            .send()
            .await
            .map_err(|e| RefreshFailure::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RefreshFailure::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = ClientError::from_response_body(status.as_u16(), &body).to_string();
            return Err(RefreshFailure::Rejected(message));
        }

        let parsed: TokenResponse = serde_json::from_slice(&body).map_err(|_| RefreshFailure::MissingToken)?;
        let token = parsed
            .access_token
            .filter(|t| !t.value.is_empty())
            .ok_or(RefreshFailure::MissingToken)?;

        let value = token.value.clone();
        self.session.apply_refresh(token, parsed.user)?;
        Ok(value)
    }
}

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Notify;

use salbum_client::config::ClientConfig;
use salbum_client::session::MemoryStorage;
use salbum_client::types::{AuthUser, Token};
use salbum_client::AppContext;

pub const STALE_TOKEN: &str = "stale-token";

/// One request as the mock backend saw it
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub client_type: Option<String>,
    pub content_type: Option<String>,
    pub cookie: Option<String>,
}

/// Knobs and counters shared between a test and its mock backend
#[derive(Default)]
pub struct MockState {
    pub valid_token: Mutex<String>,
    tokens_issued: AtomicUsize,
    pub seen: Mutex<Vec<Seen>>,

    pub refresh_calls: AtomicUsize,
    pub refresh_fails: AtomicBool,
    pub refresh_omits_user: AtomicBool,
    pub refresh_delay_ms: AtomicU64,
    pub require_refresh_cookie: AtomicBool,
    pub always_unauthorized: AtomicBool,

    pub login_requires_code: AtomicBool,
    pub validate_login_calls: AtomicUsize,
    pub validate_email_calls: AtomicUsize,
    pub resend_calls: AtomicUsize,
    pub user: Mutex<Value>,
    /// Body of the most recent OAuth or password request
    pub last_auth_body: Mutex<Value>,

    pub entries: Mutex<Vec<Value>>,
    entries_created: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub add_calls: AtomicUsize,
    pub remove_calls: AtomicUsize,
    pub fail_adds: AtomicBool,
    pub fail_list: AtomicBool,
    pub fail_removes: AtomicBool,
    pub gate_adds: AtomicBool,
    pub add_gate: Notify,
}

impl MockState {
    fn issue_token(&self) -> String {
        let n = self.tokens_issued.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("access-{}", n);
        *self.valid_token.lock().unwrap() = token.clone();
        token
    }

    pub fn current_token(&self) -> String {
        self.valid_token.lock().unwrap().clone()
    }

    pub fn seen_paths(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|s| format!("{} {}", s.method, s.path)).collect()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.method == method && s.path == path)
            .count()
    }

    pub fn push_entry(&self, kind: &str, content_id: &str, name: &str) -> String {
        let n = self.entries_created.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("real-{}", n);
        let entry = json!({
            "id": id,
            "itemType": kind,
            kind: { "id": content_id, "name": name },
            "createdAt": "2024-05-01T10:00:00Z"
        });
        self.entries.lock().unwrap().insert(0, entry);
        id
    }

    fn record(&self, method: &str, path: &str, headers: &HeaderMap) {
        let get = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
        self.seen.lock().unwrap().push(Seen {
            method: method.to_string(),
            path: path.to_string(),
            authorization: get(header::AUTHORIZATION),
            client_type: headers
                .get("x-client-type")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            content_type: get(header::CONTENT_TYPE),
            cookie: get(header::COOKIE),
        });
    }

    fn authorized(&self, headers: &HeaderMap) -> Result<(), Response> {
        let expected = format!("Bearer {}", self.current_token());
        let presented = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
        if self.always_unauthorized.load(Ordering::SeqCst) || presented != Some(expected.as_str()) {
            return Err((StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" }))).into_response());
        }
        Ok(())
    }
}

pub struct MockServer {
    pub base_url: String,
    pub state: Arc<MockState>,
}

pub fn default_user() -> Value {
    json!({
        "id": "u1",
        "name": "Ada",
        "username": "ada",
        "email": "ada@example.com",
        "image_url": null,
        "bio": null,
        "followers_count": 3,
        "following_count": 5,
        "email_validated": true,
        "spotify_linked": false
    })
}

/// Start a mock backend on an ephemeral port for the current test runtime
pub async fn spawn_mock() -> Result<MockServer> {
    let state = Arc::new(MockState::default());
    *state.user.lock().unwrap() = default_user();
    *state.valid_token.lock().unwrap() = "never-issued".to_string();

    let router = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/validateCodeLogin", post(validate_login))
        .route("/auth/validateEmail", post(validate_email))
        .route("/auth/resendCode", post(resend_code))
        .route("/auth/refreshToken", post(refresh_token))
        .route("/auth/login/google", post(login_google))
        .route("/auth/login/spotify", post(login_spotify))
        .route("/auth/resetPassword", post(reset_password))
        .route("/auth/changePassword", post(change_password))
        .route("/users/me", get(get_me).put(put_me))
        .route("/listenlist", get(list_entries))
        // POST takes the item kind, DELETE the entry id
        .route("/listenlist/:param", post(add_entry).delete(remove_entry))
        .route("/broken", get(broken))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    Ok(MockServer {
        base_url: format!("http://{}", addr),
        state,
    })
}

/// App context against the mock with an in-memory session
pub fn app_for(server: &MockServer) -> Result<AppContext> {
    let config = ClientConfig::for_base_url(&server.base_url);
    Ok(AppContext::new(config, Arc::new(MemoryStorage::new()))?)
}

/// App context that already holds a session whose token the server rejects
pub fn app_with_stale_session(server: &MockServer) -> Result<AppContext> {
    let app = app_for(server)?;
    let user: AuthUser = serde_json::from_value(default_user())?;
    app.session().establish(Token::new(STALE_TOKEN, None), user)?;
    Ok(app)
}

/// App context holding the token the server currently accepts
pub fn app_signed_in(server: &MockServer) -> Result<AppContext> {
    let app = app_for(server)?;
    let token = server.state.issue_token();
    let user: AuthUser = serde_json::from_value(default_user())?;
    app.session().establish(Token::new(token, None), user)?;
    Ok(app)
}

fn parse(body: &Bytes) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

fn grant(state: &MockState) -> Response {
    let token = state.issue_token();
    let body = json!({
        "status": "SUCCESS",
        "user": state.user.lock().unwrap().clone(),
        "access_token": { "value": token, "expire_at": "2099-01-01T00:00:00Z" },
        "refresh_token": { "value": "r", "expire_at": "2099-01-01T00:00:00Z" },
        "context_info": null
    });
    let cookie = format!("refreshToken=refresh-{}; Path=/; HttpOnly", token);
    ([(header::SET_COOKIE, cookie)], Json(body)).into_response()
}

fn code_required(email: &str) -> Response {
    Json(json!({
        "status": "MFA_REQUIRED",
        "user": null,
        "context_info": email,
        "access_token": null,
        "refresh_token": null,
        "message": "Verification code sent"
    }))
    .into_response()
}

async fn login(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    state.record("POST", "/auth/login", &headers);
    let body = parse(&body);
    if body["password"] == "wrong" {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid credentials" }))).into_response();
    }
    if body["password"] == "locked" {
        return Json(json!({ "status": "FAILURE", "message": "Account locked" })).into_response();
    }
    if state.login_requires_code.load(Ordering::SeqCst) {
        return code_required(body["email"].as_str().unwrap_or_default());
    }
    grant(&state)
}

async fn register(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    state.record("POST", "/auth/register", &headers);
    let body = parse(&body);
    code_required(body["email"].as_str().unwrap_or_default())
}

async fn validate_login(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    state.record("POST", "/auth/validateCodeLogin", &headers);
    state.validate_login_calls.fetch_add(1, Ordering::SeqCst);
    validate(&state, parse(&body))
}

async fn validate_email(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    state.record("POST", "/auth/validateEmail", &headers);
    state.validate_email_calls.fetch_add(1, Ordering::SeqCst);
    validate(&state, parse(&body))
}

fn validate(state: &MockState, body: Value) -> Response {
    if body["code"] != "123456" {
        return Json(json!({ "status": "FAILURE", "message": "Invalid code" })).into_response();
    }
    grant(state)
}

async fn resend_code(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record("POST", "/auth/resendCode", &headers);
    state.resend_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "message": "sent" })).into_response()
}

pub const GOOGLE_ID_TOKEN: &str = "google-id-token";
pub const SPOTIFY_CODE: &str = "spotify-code";
pub const RESET_TOKEN: &str = "reset-token";

fn remember_body(state: &MockState, path: &str, headers: &HeaderMap, body: &Bytes) -> Value {
    state.record("POST", path, headers);
    let body = parse(body);
    *state.last_auth_body.lock().unwrap() = body.clone();
    body
}

async fn login_google(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    let body = remember_body(&state, "/auth/login/google", &headers, &body);
    if body["id_token"] != GOOGLE_ID_TOKEN {
        return Json(json!({ "status": "FAILURE" })).into_response();
    }
    grant(&state)
}

async fn login_spotify(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    let body = remember_body(&state, "/auth/login/spotify", &headers, &body);
    let verifier = body["code_verifier"].as_str().unwrap_or_default();
    if body["code"] != SPOTIFY_CODE || verifier.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "message": "invalid_grant" }))).into_response();
    }
    grant(&state)
}

async fn reset_password(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    remember_body(&state, "/auth/resetPassword", &headers, &body);
    Json(json!({ "message": "Reset link sent" })).into_response()
}

async fn change_password(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    let body = remember_body(&state, "/auth/changePassword", &headers, &body);
    if body["token"] != RESET_TOKEN {
        return (StatusCode::BAD_REQUEST, Json(json!({ "message": "Reset token expired" }))).into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn refresh_token(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record("POST", "/auth/refreshToken", &headers);
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let has_cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|c| c.contains("refreshToken="))
        .unwrap_or(false);
    if state.refresh_fails.load(Ordering::SeqCst) || (state.require_refresh_cookie.load(Ordering::SeqCst) && !has_cookie) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid refresh token" }))).into_response();
    }

    let token = state.issue_token();
    let user = if state.refresh_omits_user.load(Ordering::SeqCst) {
        Value::Null
    } else {
        state.user.lock().unwrap().clone()
    };
    let cookie = format!("refreshToken=refresh-{}; Path=/; HttpOnly", token);
    (
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "access_token": { "value": token, "expire_at": "2099-01-01T00:00:00Z" },
            "token_type": "Bearer",
            "user": user
        })),
    )
        .into_response()
}

async fn get_me(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record("GET", "/users/me", &headers);
    if let Err(denied) = state.authorized(&headers) {
        return denied;
    }
    Json(state.user.lock().unwrap().clone()).into_response()
}

async fn put_me(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    state.record("PUT", "/users/me", &headers);
    if let Err(denied) = state.authorized(&headers) {
        return denied;
    }

    let body = parse(&body);
    let mut user = state.user.lock().unwrap();
    if let (Some(user), Some(changes)) = (user.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            user.insert(key.clone(), value.clone());
        }
        // Server-side normalisation the client must not second-guess
        if let Some(Value::String(username)) = user.get("username").cloned() {
            user.insert("username".into(), Value::String(username.to_lowercase()));
        }
    }
    Json(user.clone()).into_response()
}

async fn list_entries(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record("GET", "/listenlist", &headers);
    if let Err(denied) = state.authorized(&headers) {
        return denied;
    }
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    if state.fail_list.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "list failed" }))).into_response();
    }
    Json(Value::Array(state.entries.lock().unwrap().clone())).into_response()
}

async fn add_entry(
    State(state): State<Arc<MockState>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.record("POST", &format!("/listenlist/{}", kind), &headers);
    if let Err(denied) = state.authorized(&headers) {
        return denied;
    }
    state.add_calls.fetch_add(1, Ordering::SeqCst);

    if state.gate_adds.load(Ordering::SeqCst) {
        state.add_gate.notified().await;
    }
    if state.fail_adds.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "Could not add item" }))).into_response();
    }

    let body = parse(&body);
    let item_id = body["itemId"].as_str().unwrap_or_default().to_string();
    let id = state.push_entry(&kind, &item_id, &format!("{} {}", kind, item_id));
    (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
}

async fn remove_entry(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record("DELETE", &format!("/listenlist/{}", id), &headers);
    if let Err(denied) = state.authorized(&headers) {
        return denied;
    }
    state.remove_calls.fetch_add(1, Ordering::SeqCst);
    if state.fail_removes.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "Could not remove item" }))).into_response();
    }
    state
        .entries
        .lock()
        .unwrap()
        .retain(|e| e["id"].as_str() != Some(id.as_str()));
    StatusCode::NO_CONTENT.into_response()
}

async fn broken(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record("GET", "/broken", &headers);
    if let Err(denied) = state.authorized(&headers) {
        return denied;
    }
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

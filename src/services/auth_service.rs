use serde::Serialize;
use serde_json::json;

use crate::api::{ApiClient, RequestOptions};
use crate::error::ClientResult;
use crate::types::auth::MessageResponse;
use crate::types::{AuthResponse, MfaContext};

/// Credential endpoints under `/auth`. None of them carry a bearer token.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::post().json(body)?.skip_auth();
        self.client.request(path, options).await
    }

    pub async fn register(&self, name: &str, username: &str, email: &str, password: &str) -> ClientResult<AuthResponse> {
        self.post(
            "/auth/register",
            &json!({ "name": name, "username": username, "email": email, "password": password }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<AuthResponse> {
        self.post("/auth/login", &json!({ "email": email, "password": password })).await
    }

    /// Confirm an emailed code on the endpoint matching the flow
    pub async fn validate_code(&self, context: MfaContext, email: &str, code: &str) -> ClientResult<AuthResponse> {
        self.post(context.validation_path(), &json!({ "email": email, "code": code })).await
    }

    pub async fn resend_code(&self, context: MfaContext, email: &str) -> ClientResult<()> {
        let options = RequestOptions::post()
            .json(&json!({ "email": email, "context": context }))?
            .skip_auth();
        self.client.execute("/auth/resendCode", options).await
    }

    pub async fn login_google(&self, id_token: &str) -> ClientResult<AuthResponse> {
        self.post("/auth/login/google", &json!({ "id_token": id_token })).await
    }

    pub async fn login_spotify(&self, code: &str, redirect_uri: &str, code_verifier: &str) -> ClientResult<AuthResponse> {
        self.post(
            "/auth/login/spotify",
            &json!({ "code": code, "redirect_uri": redirect_uri, "code_verifier": code_verifier }),
        )
        .await
    }

    pub async fn reset_password(&self, email: &str) -> ClientResult<MessageResponse> {
        self.post("/auth/resetPassword", &json!({ "email": email })).await
    }

    pub async fn change_password(&self, new_password: &str, token: &str) -> ClientResult<()> {
        let options = RequestOptions::post()
            .json(&json!({ "newPassword": new_password, "token": token }))?
            .skip_auth();
        self.client.execute("/auth/changePassword", options).await
    }
}

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::types::{AuthUser, UpdateProfileRequest};

#[derive(Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// GET /users/me
    pub async fn me(&self) -> ClientResult<AuthUser> {
        self.client.get("/users/me").await
    }

    /// PUT /users/me, returns the server's updated record
    pub async fn update_me(&self, request: &UpdateProfileRequest) -> ClientResult<AuthUser> {
        self.client.put("/users/me", request).await
    }
}

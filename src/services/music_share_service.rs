use serde_json::json;

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::types::{ItemKind, MusicShare};

#[derive(Clone)]
pub struct MusicShareService {
    client: ApiClient,
}

impl MusicShareService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// POST /musicShare/{kind} with `{ itemId, comment }`
    pub async fn create(&self, kind: ItemKind, item_id: &str, comment: &str) -> ClientResult<MusicShare> {
        self.client
            .post(
                &format!("/musicShare/{}", kind),
                &json!({ "itemId": item_id, "comment": comment }),
            )
            .await
    }

    pub async fn update(&self, share_id: &str, comment: &str) -> ClientResult<MusicShare> {
        self.client
            .put(&format!("/musicShare/{}", share_id), &json!({ "comment": comment }))
            .await
    }

    pub async fn delete(&self, share_id: &str) -> ClientResult<()> {
        self.client.delete(&format!("/musicShare/{}", share_id)).await
    }
}

use serde_json::{json, Value};

use crate::api::{ApiClient, RequestOptions};
use crate::error::ClientResult;
use crate::types::{EntryId, ItemKind, ListenListEntry};

#[derive(Clone)]
pub struct ListenListService {
    client: ApiClient,
}

impl ListenListService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// GET /listenlist
    ///
    /// A non-array body is treated as an empty list; entries that fail
    /// validation are skipped.
    pub async fn list(&self) -> ClientResult<Vec<ListenListEntry>> {
        let body: Value = self.client.get("/listenlist").await?;
        let items = match body {
            Value::Array(items) => items,
            other => {
                tracing::warn!("Listen list response was not an array: {}", other);
                return Ok(Vec::new());
            }
        };

        let entries = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<ListenListEntry>(item) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping malformed listen list entry: {}", e);
                    None
                }
            })
            .collect();

        Ok(entries)
    }

    /// POST /listenlist/{kind} with `{ itemId }`
    pub async fn add(&self, kind: ItemKind, item_id: &str) -> ClientResult<()> {
        let options = RequestOptions::post().json(&json!({ "itemId": item_id }))?;
        self.client.execute(&format!("/listenlist/{}", kind), options).await
    }

    /// DELETE /listenlist/{entryId}; takes the entry id, not the content id
    pub async fn remove(&self, entry_id: &EntryId) -> ClientResult<()> {
        self.client.delete(&format!("/listenlist/{}", entry_id)).await
    }
}

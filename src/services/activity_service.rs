use url::form_urlencoded;

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::types::social::UserActivityResponse;
use crate::types::{ActivityItem, FeedResponse};

#[derive(Debug, Clone, Default)]
pub struct FeedParams {
    pub limit: Option<u32>,
    /// ISO-8601 timestamp returned as `nextCursor` by the previous page
    pub cursor: Option<String>,
}

impl FeedParams {
    fn to_path(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            query.append_pair("limit", &limit.to_string());
        }
        if let Some(cursor) = self.cursor.as_deref().filter(|c| !c.is_empty()) {
            query.append_pair("cursor", cursor);
        }

        let query = query.finish();
        if query.is_empty() {
            "/activity/feed".to_string()
        } else {
            format!("/activity/feed?{}", query)
        }
    }
}

#[derive(Clone)]
pub struct ActivityService {
    client: ApiClient,
}

impl ActivityService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Feed of followed users, one page at a time
    pub async fn feed(&self, params: &FeedParams) -> ClientResult<FeedResponse> {
        self.client.get(&params.to_path()).await
    }

    /// One user's reviews and shares as feed items, newest first
    pub async fn user_activity(&self, user_id: &str) -> ClientResult<Vec<ActivityItem>> {
        let raw: UserActivityResponse = self.client.get(&format!("/activity/user/{}", user_id)).await?;
        Ok(raw.into_feed_items())
    }
}

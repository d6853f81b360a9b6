use url::form_urlencoded;

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::types::spotify::{RecentlyPlayed, RecentlyPlayedParams, TopAlbum};

/// Spotify data proxied by the backend for a linked account
#[derive(Clone)]
pub struct SpotifyService {
    client: ApiClient,
}

impl SpotifyService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn recently_played(&self, params: &RecentlyPlayedParams) -> ClientResult<RecentlyPlayed> {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(limit) = params.limit {
            query.append_pair("limit", &limit.to_string());
        }
        if let Some(before) = &params.before {
            query.append_pair("before", before);
        }
        if let Some(after) = &params.after {
            query.append_pair("after", after);
        }

        let query = query.finish();
        let path = if query.is_empty() {
            "/spotify/me/recently-played".to_string()
        } else {
            format!("/spotify/me/recently-played?{}", query)
        };
        self.client.get(&path).await
    }

    pub async fn top_albums_last_week(&self) -> ClientResult<Vec<TopAlbum>> {
        self.client.get("/spotify/me/top-albums-last-week").await
    }
}

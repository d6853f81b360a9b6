use serde_json::json;

use crate::api::{ApiClient, RequestOptions};
use crate::error::ClientResult;
use crate::types::social::{CreateReviewRequest, FeelingOption, FullReview, TrackEmotionPoint};
use crate::types::Review;

#[derive(Clone)]
pub struct ReviewService {
    client: ApiClient,
}

impl ReviewService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn album_reviews(&self, album_id: &str) -> ClientResult<Vec<FullReview>> {
        self.client.get(&format!("/reviews/album/{}", album_id)).await
    }

    pub async fn create(&self, request: &CreateReviewRequest) -> ClientResult<Review> {
        self.client.post("/reviews", request).await
    }

    pub async fn update(&self, review_id: &str, content: &str) -> ClientResult<Review> {
        self.client
            .put(&format!("/reviews/{}", review_id), &json!({ "content": content }))
            .await
    }

    pub async fn delete(&self, review_id: &str) -> ClientResult<()> {
        self.client.delete(&format!("/reviews/{}", review_id)).await
    }

    pub async fn like(&self, review_id: &str) -> ClientResult<()> {
        self.client
            .execute(&format!("/reviews/{}/like", review_id), RequestOptions::post())
            .await
    }

    pub async fn unlike(&self, review_id: &str) -> ClientResult<()> {
        self.client.delete(&format!("/reviews/{}/like", review_id)).await
    }

    pub async fn feelings(&self) -> ClientResult<Vec<FeelingOption>> {
        self.client.get("/reviews/feelings").await
    }

    pub async fn emotion_chart(&self, review_id: &str) -> ClientResult<Vec<TrackEmotionPoint>> {
        self.client.get(&format!("/reviews/{}/emotion-chart", review_id)).await
    }
}

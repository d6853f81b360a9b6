use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{AlbumInfo, ArtistInfo, MusicInfo};

/// Public view of another user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackScore {
    pub track_id: String,
    #[serde(default)]
    pub track_number: u32,
    #[serde(default)]
    pub track_name: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub feeling: Option<String>,
}

/// Review as returned by the review and feed endpoints.
///
/// Feed items omit `updatedAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub user: UserInfo,
    #[serde(default)]
    pub content: Option<String>,
    pub album: AlbumInfo,
    #[serde(default)]
    pub album_score: Option<f64>,
    #[serde(default)]
    pub track_scores: Option<Vec<TrackScore>>,
    #[serde(default, deserialize_with = "super::timestamp_or_epoch")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "super::lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Review plus its social counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullReview {
    pub review: Review,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub liked_by_current_user: bool,
    #[serde(default)]
    pub comment_count: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub album_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_score: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub track_scores: Vec<TrackScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeelingOption {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub emoji: String,
    /// -2 to +2
    #[serde(default)]
    pub intensity: i8,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEmotionPoint {
    pub track_number: u32,
    #[serde(default)]
    pub track_name: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub feeling: Option<String>,
    #[serde(default)]
    pub intensity: Option<i8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicShare {
    pub id: String,
    pub user: UserInfo,
    #[serde(default)]
    pub album: Option<AlbumInfo>,
    #[serde(default)]
    pub music: Option<MusicInfo>,
    #[serde(default)]
    pub artist: Option<ArtistInfo>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "super::timestamp_or_epoch")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "super::lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    Review,
    /// Rendered the same as a review
    Rating,
    MusicShare,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    #[serde(rename = "type")]
    pub kind: ActivityType,
    #[serde(default, deserialize_with = "super::timestamp_or_epoch")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub review: Option<FullReview>,
    #[serde(default)]
    pub music_share: Option<MusicShare>,
}

impl ActivityItem {
    pub fn from_review(review: FullReview) -> Self {
        Self {
            kind: ActivityType::Review,
            timestamp: review.review.created_at,
            review: Some(review),
            music_share: None,
        }
    }

    pub fn from_share(share: MusicShare) -> Self {
        Self {
            kind: ActivityType::MusicShare,
            timestamp: share.created_at,
            review: None,
            music_share: Some(share),
        }
    }
}

/// One page of `/activity/feed`; missing fields default to an empty last page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    #[serde(default)]
    pub data: Vec<ActivityItem>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Raw `/activity/user/{id}` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserActivityResponse {
    #[serde(default)]
    pub reviews: Vec<FullReview>,
    #[serde(default)]
    pub music_shares: Vec<MusicShare>,
}

impl UserActivityResponse {
    /// Merge reviews and shares into feed items, newest first
    pub fn into_feed_items(self) -> Vec<ActivityItem> {
        let mut items: Vec<ActivityItem> = self
            .reviews
            .into_iter()
            .map(ActivityItem::from_review)
            .chain(self.music_shares.into_iter().map(ActivityItem::from_share))
            .collect();

        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        items
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::listen_list::ItemKind;
use super::social::Review;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mbid: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub album_type: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub mbid: Option<String>,
    #[serde(default)]
    pub spotify_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MusicInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Duration in milliseconds
    #[serde(default)]
    pub length: Option<u64>,
    #[serde(default)]
    pub mbid: Option<String>,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub artists: Vec<ArtistInfo>,
    #[serde(default)]
    pub album: Option<Box<AlbumInfo>>,
}

impl AlbumInfo {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl ArtistInfo {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl MusicInfo {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Kind filter for catalog search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Album,
    Artist,
    Music,
}

impl From<ItemKind> for SearchKind {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Album => SearchKind::Album,
            ItemKind::Artist => SearchKind::Artist,
            ItemKind::Music => SearchKind::Music,
        }
    }
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Album => "album",
            SearchKind::Artist => "artist",
            SearchKind::Music => "music",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub query: String,
    pub kind: Option<SearchKind>,
    pub artist: Option<String>,
    pub force: bool,
}

/// `/fetch` results, discriminated by the response's `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum SearchResults {
    Album(Vec<AlbumInfo>),
    Artist(Vec<ArtistInfo>),
    Music(Vec<MusicInfo>),
}

impl SearchResults {
    pub fn len(&self) -> usize {
        match self {
            SearchResults::Album(v) => v.len(),
            SearchResults::Artist(v) => v.len(),
            SearchResults::Music(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Album with its track list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumDetails {
    #[serde(flatten)]
    pub album: AlbumInfo,
    #[serde(default)]
    pub musics: Vec<MusicInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseDetails {
    pub album: AlbumDetails,
    #[serde(default, rename = "userReview")]
    pub user_review: Option<Review>,
    #[serde(default)]
    pub spotify_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistDetails {
    #[serde(flatten)]
    pub artist: ArtistInfo,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub albums: Vec<AlbumInfo>,
    #[serde(default)]
    pub born_date: Option<String>,
    #[serde(default)]
    pub death_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistDetailsResponse {
    pub artist: ArtistDetails,
    #[serde(default, rename = "userReview")]
    pub user_review: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumImage {
    pub image_url: String,
}

/// Presigned storage URL for a direct image upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadUrl {
    pub url: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMusic {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    pub position: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artist_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateAlbum {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub album_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub musics: Vec<CreateMusic>,
    #[serde(rename = "artistIds")]
    pub artist_ids: Vec<String>,
    /// `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spotify_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateArtist {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub born_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

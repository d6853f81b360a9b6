use url::form_urlencoded;

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::types::catalog::{
    AlbumDetails, AlbumImage, ArtistDetails, ArtistDetailsResponse, CreateAlbum, CreateArtist, ReleaseDetails,
    SearchParams, SearchResults, UploadUrl,
};
use crate::types::{AlbumInfo, ArtistInfo};

/// Albums, artists and the external catalog lookup
#[derive(Clone)]
pub struct CatalogService {
    client: ApiClient,
}

fn force_suffix(force: bool) -> &'static str {
    if force {
        "?force=true"
    } else {
        ""
    }
}

impl CatalogService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// GET /fetch?q=..&type=..&artist=..&force=true
    pub async fn search(&self, params: &SearchParams) -> ClientResult<SearchResults> {
        if params.query.trim().is_empty() {
            return Err(ClientError::validation("Search query is empty."));
        }

        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("q", params.query.trim());
        if let Some(kind) = params.kind {
            query.append_pair("type", kind.as_str());
        }
        if let Some(artist) = params.artist.as_deref().filter(|a| !a.is_empty()) {
            query.append_pair("artist", artist);
        }
        if params.force {
            query.append_pair("force", "true");
        }

        self.client.get(&format!("/fetch?{}", query.finish())).await
    }

    pub async fn release_details(&self, album_id: &str, force: bool) -> ClientResult<ReleaseDetails> {
        self.client
            .get(&format!("/fetch/releaseDetails/{}{}", album_id, force_suffix(force)))
            .await
    }

    pub async fn artist_details(&self, artist_id: &str, force: bool) -> ClientResult<ArtistDetailsResponse> {
        self.client
            .get(&format!("/artists/{}{}", artist_id, force_suffix(force)))
            .await
    }

    pub async fn album_image(&self, album_id: &str) -> ClientResult<AlbumImage> {
        self.client.get(&format!("/fetch/album/{}/fetchImage", album_id)).await
    }

    pub async fn create_album(&self, album: &CreateAlbum) -> ClientResult<AlbumDetails> {
        self.client.post("/albums", album).await
    }

    pub async fn update_album(&self, album_id: &str, album: &CreateAlbum) -> ClientResult<AlbumInfo> {
        self.client.put(&format!("/albums/{}", album_id), album).await
    }

    pub async fn album_upload_url(&self, album_id: &str) -> ClientResult<UploadUrl> {
        self.client.get(&format!("/albums/{}/uploadImageUrl", album_id)).await
    }

    pub async fn create_artist(&self, artist: &CreateArtist) -> ClientResult<ArtistDetails> {
        self.client.post("/artists", artist).await
    }

    pub async fn update_artist(&self, artist_id: &str, artist: &CreateArtist) -> ClientResult<ArtistDetails> {
        self.client.put(&format!("/artists/{}", artist_id), artist).await
    }

    pub async fn artist_upload_url(&self, artist_id: &str) -> ClientResult<UploadUrl> {
        self.client.get(&format!("/artists/{}/uploadImageUrl", artist_id)).await
    }

    /// GET /artists?query=..
    pub async fn search_artists(&self, query: &str) -> ClientResult<Vec<ArtistInfo>> {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.client.get(&format!("/artists?query={}", encoded)).await
    }

    /// PUT raw image bytes to a presigned storage URL.
    ///
    /// Goes straight to storage: no API headers, no bearer token.
    pub async fn upload_image(&self, presigned_url: &str, bytes: Vec<u8>, content_type: Option<&str>) -> ClientResult<()> {
        let response = self
            .client
            .http()
            .put(presigned_url)
            .header(reqwest::header::CONTENT_TYPE, content_type.unwrap_or("image/jpeg"))
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: format!("Upload failed: {}", status.as_u16()),
            });
        }
        Ok(())
    }
}

use std::sync::Arc;

use reqwest::cookie::Jar;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::listen_list::ListenList;
use crate::services::{
    ActivityService, CatalogService, ListenListService, MusicShareService, ReviewService, SpotifyService,
};
use crate::session::{SessionState, SessionStorage, SessionStore};

/// Everything a front end needs, wired around one shared session.
///
/// Built once at startup and passed down; clones share the same state.
#[derive(Clone)]
pub struct AppContext {
    pub config: ClientConfig,
    pub client: ApiClient,
    pub auth: Arc<SessionStore>,
    pub listen_list: Arc<ListenList>,
    pub catalog: CatalogService,
    pub reviews: ReviewService,
    pub activity: ActivityService,
    pub shares: MusicShareService,
    pub spotify: SpotifyService,
}

impl AppContext {
    pub fn new(config: ClientConfig, storage: Arc<dyn SessionStorage>) -> ClientResult<Self> {
        Self::with_cookie_jar(config, storage, Arc::new(Jar::default()))
    }

    /// Same as `new`, with a caller-owned cookie jar so the refresh cookie
    /// can be saved and restored across processes
    pub fn with_cookie_jar(config: ClientConfig, storage: Arc<dyn SessionStorage>, jar: Arc<Jar>) -> ClientResult<Self> {
        let session = Arc::new(SessionState::restore(storage));
        let client = ApiClient::builder(&config.api, session).cookie_jar(jar).build()?;

        Ok(Self {
            auth: Arc::new(SessionStore::new(client.clone())),
            listen_list: Arc::new(ListenList::new(ListenListService::new(client.clone()))),
            catalog: CatalogService::new(client.clone()),
            reviews: ReviewService::new(client.clone()),
            activity: ActivityService::new(client.clone()),
            shares: MusicShareService::new(client.clone()),
            spotify: SpotifyService::new(client.clone()),
            client,
            config,
        })
    }

    pub fn session(&self) -> &Arc<SessionState> {
        self.client.session()
    }

    /// Local sign-out: clears the session, any pending challenge and the cached list
    pub fn logout(&self) {
        self.auth.logout();
        self.listen_list.reset();
    }
}

pub mod activity_service;
pub mod auth_service;
pub mod catalog_service;
pub mod listen_list_service;
pub mod music_share_service;
pub mod review_service;
pub mod spotify_service;
pub mod user_service;

pub use activity_service::{ActivityService, FeedParams};
pub use auth_service::AuthService;
pub use catalog_service::CatalogService;
pub use listen_list_service::ListenListService;
pub use music_share_service::MusicShareService;
pub use review_service::ReviewService;
pub use spotify_service::SpotifyService;
pub use user_service::UserService;

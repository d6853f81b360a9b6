pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod listen_list;
pub mod oauth;
pub mod services;
pub mod session;
pub mod types;

pub use api::ApiClient;
pub use app::AppContext;
pub use error::{ClientError, ClientResult};
pub use listen_list::ListenList;
pub use session::{SessionState, SessionStore};

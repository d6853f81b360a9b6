pub mod client;
mod refresh;

pub use client::{ApiClient, ApiClientBuilder, RequestOptions, CLIENT_TYPE_HEADER, REFRESH_PATH};

pub mod auth;
pub mod feed;
pub mod listen;
pub mod profile;
pub mod search;

/// Wire types shared across services, stores and the CLI
pub mod auth;
pub mod catalog;
pub mod listen_list;
pub mod social;
pub mod spotify;

pub use auth::{AuthResponse, AuthStatus, AuthUser, MfaContext, Token, TokenResponse, UpdateProfileRequest};
pub use catalog::{AlbumInfo, ArtistInfo, MusicInfo};
pub use listen_list::{EntryId, ItemKind, ListenItem, ListenListEntry};
pub use social::{ActivityItem, ActivityType, FeedResponse, MusicShare, Review, UserInfo};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Parse an ISO 8601 timestamp. Strings without an offset are taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parse an optional timestamp, treating null, empty and unparseable
/// strings as absent.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Like `lenient_timestamp` for required fields; anything unreadable falls
/// back to the Unix epoch so the record itself is kept.
pub(crate) fn timestamp_or_epoch<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_timestamp(deserializer)?.unwrap_or_default())
}

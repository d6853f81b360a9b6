use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::catalog::{AlbumInfo, ArtistInfo, MusicInfo};

const PLACEHOLDER_PREFIX: &str = "optimistic-";

/// Kind of content a listen-list entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Album,
    Music,
    Artist,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Album => "album",
            ItemKind::Music => "music",
            ItemKind::Artist => "artist",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "album" => Ok(ItemKind::Album),
            "music" | "track" => Ok(ItemKind::Music),
            "artist" => Ok(ItemKind::Artist),
            other => Err(format!("unknown item type '{}'", other)),
        }
    }
}

/// Identity of a listen-list entry, distinct from the content it references
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Local identity for an entry the server has not confirmed yet.
    /// Server ids never carry the `optimistic-` prefix.
    pub fn placeholder(kind: ItemKind, content_id: &str) -> Self {
        Self(format!("{}{}-{}", PLACEHOLDER_PREFIX, kind, content_id))
    }

    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with(PLACEHOLDER_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The one piece of content an entry references
#[derive(Debug, Clone, PartialEq)]
pub enum ListenItem {
    Album(AlbumInfo),
    Music(MusicInfo),
    Artist(ArtistInfo),
}

impl ListenItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            ListenItem::Album(_) => ItemKind::Album,
            ListenItem::Music(_) => ItemKind::Music,
            ListenItem::Artist(_) => ItemKind::Artist,
        }
    }

    pub fn content_id(&self) -> &str {
        match self {
            ListenItem::Album(a) => &a.id,
            ListenItem::Music(m) => &m.id,
            ListenItem::Artist(a) => &a.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ListenItem::Album(a) => &a.name,
            ListenItem::Music(m) => &m.name,
            ListenItem::Artist(a) => &a.name,
        }
    }

    /// Bare reference carrying only the content id
    pub fn bare(kind: ItemKind, content_id: &str) -> Self {
        match kind {
            ItemKind::Album => ListenItem::Album(AlbumInfo::with_id(content_id)),
            ItemKind::Music => ListenItem::Music(MusicInfo::with_id(content_id)),
            ItemKind::Artist => ListenItem::Artist(ArtistInfo::with_id(content_id)),
        }
    }
}

/// A listen-list record linking the user to exactly one album, track or artist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEntry", into = "RawEntry")]
pub struct ListenListEntry {
    pub id: EntryId,
    pub item: ListenItem,
    pub created_at: DateTime<Utc>,
}

impl ListenListEntry {
    pub fn placeholder(kind: ItemKind, content_id: &str) -> Self {
        Self {
            id: EntryId::placeholder(kind, content_id),
            item: ListenItem::bare(kind, content_id),
            created_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.item.kind()
    }

    pub fn references(&self, kind: ItemKind, content_id: &str) -> bool {
        self.item.kind() == kind && self.item.content_id() == content_id
    }
}

/// Wire shape of `GET /listenlist` items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    id: String,
    #[serde(default)]
    album: Option<AlbumInfo>,
    #[serde(default)]
    music: Option<MusicInfo>,
    #[serde(default)]
    artist: Option<ArtistInfo>,
    item_type: String,
    #[serde(default, deserialize_with = "crate::types::timestamp_or_epoch")]
    created_at: DateTime<Utc>,
}

impl TryFrom<RawEntry> for ListenListEntry {
    type Error = String;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        if raw.id.trim().is_empty() {
            return Err("listen-list entry without id".to_string());
        }

        let declared: ItemKind = raw.item_type.parse()?;
        let item = match (raw.album, raw.music, raw.artist) {
            (Some(album), None, None) => ListenItem::Album(album),
            (None, Some(music), None) => ListenItem::Music(music),
            (None, None, Some(artist)) => ListenItem::Artist(artist),
            (None, None, None) => return Err(format!("entry {} references no content", raw.id)),
            _ => return Err(format!("entry {} references more than one content item", raw.id)),
        };

        if item.kind() != declared {
            return Err(format!(
                "entry {} declares itemType '{}' but carries {}",
                raw.id,
                declared,
                item.kind()
            ));
        }

        Ok(Self {
            id: EntryId::new(raw.id),
            item,
            created_at: raw.created_at,
        })
    }
}

impl From<ListenListEntry> for RawEntry {
    fn from(entry: ListenListEntry) -> Self {
        let item_type = entry.item.kind().to_string();
        let (album, music, artist) = match entry.item {
            ListenItem::Album(a) => (Some(a), None, None),
            ListenItem::Music(m) => (None, Some(m), None),
            ListenItem::Artist(a) => (None, None, Some(a)),
        };

        RawEntry {
            id: entry.id.0,
            album,
            music,
            artist,
            item_type,
            created_at: entry.created_at,
        }
    }
}

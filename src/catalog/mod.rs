use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod http;

/// Description written on every playlist this tool creates on the destination.
pub const IMPORT_DESCRIPTION: &str = "Imported from Spotify";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogError {
    Auth,
    Transport,
    RateLimited,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Auth => f.write_str("Catalog authorization error"),
            CatalogError::Transport => f.write_str("Catalog transport error"),
            CatalogError::RateLimited => f.write_str("Catalog rate limit error"),
        }
    }
}

impl std::error::Error for CatalogError {}

pub type CatalogResult<T> = error_stack::Result<T, CatalogError>;

/// A playlist as listed by either platform. On the source the `id` is the
/// identity, on the destination playlists are joined by `name`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
}

impl Playlist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Track {
    /// 1-based, counted over the entries that carry media.
    pub position: usize,
    pub title: String,
    pub primary_artist: String,
}

impl Track {
    pub fn new(position: usize, title: impl Into<String>, primary_artist: impl Into<String>) -> Self {
        Self {
            position,
            title: title.into(),
            primary_artist: primary_artist.into(),
        }
    }

    /// Text used verbatim as the search key on the destination.
    pub fn query(&self) -> String {
        format!("{} {}", self.title, self.primary_artist)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VideoRef(String);

impl VideoRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type ExistingEntrySet = HashSet<VideoRef>;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    clap::ValueEnum,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Privacy {
    #[default]
    Public,
    Unlisted,
    Private,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogReader: Send + Sync {
    /// Every playlist visible to the authenticated user, in source order.
    async fn list_playlists(&self) -> CatalogResult<Vec<Playlist>>;
    /// Ordered tracks of a playlist; entries without media are dropped.
    async fn list_tracks(&self, playlist_id: &str) -> CatalogResult<Vec<Track>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogWriter: Send + Sync {
    async fn list_playlists(&self) -> CatalogResult<Vec<Playlist>>;
    async fn create_playlist(
        &self,
        name: &str,
        description: &str,
        privacy: Privacy,
    ) -> CatalogResult<Playlist>;
    async fn list_entries(&self, playlist_id: &str) -> CatalogResult<ExistingEntrySet>;
    async fn append_entry(&self, playlist_id: &str, video: &VideoRef) -> CatalogResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TrackMatcher: Send + Sync {
    /// Top destination result for `query`, if any.
    async fn find_match(&self, query: &str) -> CatalogResult<Option<VideoRef>>;
}

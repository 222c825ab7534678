//! Wire shapes of the YouTube Data API v3 resources this tool touches.

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct PlaylistResource {
    pub id: String,
    pub snippet: PlaylistSnippet,
}

#[derive(Deserialize, Debug)]
pub struct PlaylistSnippet {
    pub title: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemResource {
    pub content_details: ContentDetails,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetails {
    pub video_id: String,
}

#[derive(Deserialize, Debug)]
pub struct SearchResult {
    pub id: SearchResultId,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    pub video_id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreatedResource {
    pub id: String,
}

#[derive(Serialize, Debug)]
pub struct NewPlaylist<'a> {
    pub snippet: NewPlaylistSnippet<'a>,
    pub status: NewPlaylistStatus,
}

#[derive(Serialize, Debug)]
pub struct NewPlaylistSnippet<'a> {
    pub title: &'a str,
    pub description: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewPlaylistStatus {
    pub privacy_status: String,
}

#[derive(Serialize, Debug)]
pub struct NewPlaylistItem<'a> {
    pub snippet: NewPlaylistItemSnippet<'a>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewPlaylistItemSnippet<'a> {
    pub playlist_id: &'a str,
    pub resource_id: ResourceId<'a>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId<'a> {
    pub kind: &'static str,
    pub video_id: &'a str,
}

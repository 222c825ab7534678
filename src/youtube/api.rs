use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::AccessToken;
use crate::catalog::http::{read_json, send};
use crate::catalog::{
    CatalogResult, CatalogWriter, ExistingEntrySet, Playlist, Privacy, TrackMatcher, VideoRef,
};
use crate::retry::RetryPolicy;
use crate::youtube::types::{
    CreatedResource, ListResponse, NewPlaylist, NewPlaylistItem, NewPlaylistItemSnippet,
    NewPlaylistSnippet, NewPlaylistStatus, PlaylistItemResource, PlaylistResource, ResourceId,
    SearchResult,
};

pub const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";

const PAGE_SIZE: &str = "50";

/// YouTube Data API v3 client. It is both the destination catalog and the
/// track matcher.
pub struct YoutubeClient {
    http: reqwest::Client,
    base_url: String,
    access_token: AccessToken,
    retry: RetryPolicy,
}

impl YoutubeClient {
    pub fn new(access_token: AccessToken) -> Self {
        Self::with_base_url(YOUTUBE_API_URL, access_token)
    }

    pub fn with_base_url(base_url: impl Into<String>, access_token: AccessToken) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> CatalogResult<T> {
        let url = format!("{}/{}", self.base_url, resource);
        let url = url.as_str();
        let description = format!("GET {resource}");
        let description = description.as_str();
        self.retry
            .run(description, move || async move {
                let request = self
                    .http
                    .get(url)
                    .bearer_auth(self.access_token.secret())
                    .query(query);
                let response = send(request, description).await?;
                read_json::<T>(response, description).await
            })
            .await
    }

    async fn post<B, T>(&self, resource: &str, query: &[(&str, &str)], body: &B) -> CatalogResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, resource);
        let url = url.as_str();
        let description = format!("POST {resource}");
        let description = description.as_str();
        self.retry
            .run(description, move || async move {
                let request = self
                    .http
                    .post(url)
                    .bearer_auth(self.access_token.secret())
                    .query(query)
                    .json(body);
                let response = send(request, description).await?;
                read_json::<T>(response, description).await
            })
            .await
    }

    /// Follows `nextPageToken` until the last page.
    async fn list_all<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> CatalogResult<Vec<T>> {
        let mut items = vec![];
        let mut page_token: Option<String> = None;
        loop {
            let page: ListResponse<T> = {
                let mut query = params.to_vec();
                if let Some(token) = page_token.as_deref() {
                    query.push(("pageToken", token));
                }
                self.get(resource, &query).await?
            };
            items.extend(page.items);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(items)
    }
}

#[async_trait::async_trait]
impl CatalogWriter for YoutubeClient {
    async fn list_playlists(&self) -> CatalogResult<Vec<Playlist>> {
        let playlists = self
            .list_all::<PlaylistResource>(
                "playlists",
                &[("part", "snippet"), ("mine", "true"), ("maxResults", PAGE_SIZE)],
            )
            .await?
            .into_iter()
            .map(|playlist| Playlist::new(playlist.id, playlist.snippet.title))
            .collect::<Vec<_>>();
        log::debug!("YouTube returned {} playlists", playlists.len());
        Ok(playlists)
    }

    async fn create_playlist(
        &self,
        name: &str,
        description: &str,
        privacy: Privacy,
    ) -> CatalogResult<Playlist> {
        let body = NewPlaylist {
            snippet: NewPlaylistSnippet {
                title: name,
                description,
            },
            status: NewPlaylistStatus {
                privacy_status: privacy.to_string(),
            },
        };
        let created: CreatedResource = self
            .post("playlists", &[("part", "snippet,status")], &body)
            .await?;
        log::info!("Created YouTube playlist {name:?} ({})", created.id);
        Ok(Playlist::new(created.id, name))
    }

    async fn list_entries(&self, playlist_id: &str) -> CatalogResult<ExistingEntrySet> {
        let items = self
            .list_all::<PlaylistItemResource>(
                "playlistItems",
                &[
                    ("part", "contentDetails"),
                    ("playlistId", playlist_id),
                    ("maxResults", PAGE_SIZE),
                ],
            )
            .await?;
        Ok(items
            .into_iter()
            .map(|item| VideoRef::new(item.content_details.video_id))
            .collect())
    }

    async fn append_entry(&self, playlist_id: &str, video: &VideoRef) -> CatalogResult<()> {
        let body = NewPlaylistItem {
            snippet: NewPlaylistItemSnippet {
                playlist_id,
                resource_id: ResourceId {
                    kind: "youtube#video",
                    video_id: video.as_str(),
                },
            },
        };
        let _: serde::de::IgnoredAny = self
            .post("playlistItems", &[("part", "snippet")], &body)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TrackMatcher for YoutubeClient {
    async fn find_match(&self, query: &str) -> CatalogResult<Option<VideoRef>> {
        let response: ListResponse<SearchResult> = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("q", query),
                    ("type", "video"),
                    ("maxResults", "1"),
                ],
            )
            .await?;
        Ok(response
            .items
            .into_iter()
            .next()
            .and_then(|result| result.id.video_id)
            .map(VideoRef::new))
    }
}

use error_stack::{IntoReport, ResultExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::auth::AccessToken;
use crate::catalog::http::{read_json, send};
use crate::catalog::{CatalogError, CatalogReader, CatalogResult, Playlist, Track};
use crate::retry::RetryPolicy;

pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

const PLAYLISTS_PAGE_SIZE: &str = "50";
const TRACKS_PAGE_SIZE: &str = "100";

#[derive(Deserialize, Clone, Debug)]
struct Page<T> {
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
struct ApiPlaylist {
    id: String,
    name: String,
}

#[derive(Deserialize, Clone, Debug)]
struct PlaylistItem {
    track: Option<ApiTrack>,
}

#[derive(Deserialize, Clone, Debug)]
struct ApiTrack {
    name: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
}

#[derive(Deserialize, Clone, Debug)]
struct ApiArtist {
    name: String,
}

/// Reads the current user's playlists from the Spotify Web API.
pub struct SpotifyClient {
    http: reqwest::Client,
    base_url: String,
    access_token: AccessToken,
    retry: RetryPolicy,
}

impl SpotifyClient {
    pub fn new(access_token: AccessToken) -> Self {
        Self::with_base_url(SPOTIFY_API_URL, access_token)
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

    fn first_page_url(&self, path: &str, limit: &str) -> CatalogResult<String> {
        let url = Url::parse_with_params(&format!("{}{}", self.base_url, path), &[("limit", limit)])
            .into_report()
            .change_context(CatalogError::Transport)
            .attach_printable_lazy(|| format!("Invalid Spotify url for {path}"))?;
        Ok(url.to_string())
    }

    async fn get_page<T: DeserializeOwned>(&self, url: &str) -> CatalogResult<Page<T>> {
        let description = format!("GET {url}");
        let description = description.as_str();
        self.retry
            .run(description, move || async move {
                let request = self
                    .http
                    .get(url)
                    .bearer_auth(self.access_token.secret());
                let response = send(request, description).await?;
                read_json::<Page<T>>(response, description).await
            })
            .await
    }

    /// Follows `next` links until the last page.
    async fn get_all<T: DeserializeOwned>(&self, first_url: String) -> CatalogResult<Vec<T>> {
        let mut items = vec![];
        let mut next_url = Some(first_url);
        while let Some(url) = next_url {
            let page = self.get_page::<T>(&url).await?;
            items.extend(page.items);
            next_url = page.next;
        }
        Ok(items)
    }
}

#[async_trait::async_trait]
impl CatalogReader for SpotifyClient {
    async fn list_playlists(&self) -> CatalogResult<Vec<Playlist>> {
        let url = self.first_page_url("/me/playlists", PLAYLISTS_PAGE_SIZE)?;
        let playlists = self
            .get_all::<ApiPlaylist>(url)
            .await?
            .into_iter()
            .map(|playlist| Playlist::new(playlist.id, playlist.name))
            .collect::<Vec<_>>();
        log::debug!("Spotify returned {} playlists", playlists.len());
        Ok(playlists)
    }

    async fn list_tracks(&self, playlist_id: &str) -> CatalogResult<Vec<Track>> {
        let url = self.first_page_url(
            &format!("/playlists/{playlist_id}/tracks"),
            TRACKS_PAGE_SIZE,
        )?;
        let items = self.get_all::<PlaylistItem>(url).await?;
        Ok(tracks_from_items(items))
    }
}

/// Drops entries whose track is gone and numbers the rest from 1.
fn tracks_from_items(items: Vec<PlaylistItem>) -> Vec<Track> {
    let total = items.len();
    let tracks = items
        .into_iter()
        .filter_map(|item| item.track)
        .enumerate()
        .map(|(index, track)| {
            let primary_artist = track
                .artists
                .into_iter()
                .next()
                .map(|artist| artist.name)
                .unwrap_or_default();
            Track::new(index + 1, track.name, primary_artist)
        })
        .collect::<Vec<_>>();
    if tracks.len() < total {
        log::info!(
            "Skipped {} playlist entries without a track",
            total - tracks.len()
        );
    }
    tracks
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> SpotifyClient {
        SpotifyClient::with_base_url(server.uri(), AccessToken::new("spotify-token"))
            .with_retry_policy(RetryPolicy {
                min_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
                max_times: 2,
            })
    }

    #[tokio::test]
    async fn lists_playlists_across_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .and(query_param("offset", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "p2", "name": "Focus"}],
                "next": null,
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .and(query_param("limit", "50"))
            .and(header("authorization", "Bearer spotify-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "p1", "name": "Road Trip"}],
                "next": format!("{}/me/playlists?offset=1&limit=50", server.uri()),
            })))
            .mount(&server)
            .await;

        let playlists = client(&server).list_playlists().await.unwrap();
        assert_eq!(
            playlists,
            vec![Playlist::new("p1", "Road Trip"), Playlist::new("p2", "Focus")]
        );
    }

    #[tokio::test]
    async fn drops_missing_tracks_without_numbering_gaps() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/playlists/p1/tracks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"track": {"name": "Song A", "artists": [{"name": "Artist1"}, {"name": "Guest"}]}},
                    {"track": null},
                    {"track": {"name": "Song B", "artists": [{"name": "Artist2"}]}},
                    {"track": {"name": "Episode", "type": "episode"}},
                ],
                "next": null,
            })))
            .mount(&server)
            .await;

        let tracks = client(&server).list_tracks("p1").await.unwrap();
        assert_eq!(
            tracks,
            vec![
                Track::new(1, "Song A", "Artist1"),
                Track::new(2, "Song B", "Artist2"),
                Track::new(3, "Episode", ""),
            ]
        );
    }

    #[tokio::test]
    async fn unauthorized_is_reported_as_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
            .mount(&server)
            .await;

        let report = client(&server).list_playlists().await.unwrap_err();
        assert_eq!(*report.current_context(), CatalogError::Auth);
    }

    #[tokio::test]
    async fn retries_after_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "p1", "name": "Road Trip"}],
                "next": null,
            })))
            .mount(&server)
            .await;

        let playlists = client(&server).list_playlists().await.unwrap();
        assert_eq!(playlists.len(), 1);
    }
}

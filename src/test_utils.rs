//! In-memory platforms for exercising the sync engine end to end.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use error_stack::Report;

use crate::catalog::{
    CatalogError, CatalogReader, CatalogResult, CatalogWriter, ExistingEntrySet, Playlist, Privacy,
    Track, TrackMatcher, VideoRef,
};
use crate::selection::{SelectionResult, Selector, TrackSelection};

#[derive(Debug, Default)]
pub struct StaticSource {
    playlists: Vec<Playlist>,
    tracks: HashMap<String, Vec<Track>>,
}

impl StaticSource {
    pub fn with_playlist(mut self, id: &str, name: &str, tracks: &[(&str, &str)]) -> Self {
        self.playlists.push(Playlist::new(id, name));
        let tracks = tracks
            .iter()
            .enumerate()
            .map(|(index, (title, artist))| Track::new(index + 1, *title, *artist))
            .collect();
        self.tracks.insert(id.to_string(), tracks);
        self
    }
}

#[async_trait::async_trait]
impl CatalogReader for StaticSource {
    async fn list_playlists(&self) -> CatalogResult<Vec<Playlist>> {
        Ok(self.playlists.clone())
    }

    async fn list_tracks(&self, playlist_id: &str) -> CatalogResult<Vec<Track>> {
        Ok(self.tracks.get(playlist_id).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPlaylist {
    pub name: String,
    pub description: String,
    pub privacy: Privacy,
}

#[derive(Debug, Default)]
struct DestinationState {
    playlists: Vec<Playlist>,
    entries: HashMap<String, Vec<VideoRef>>,
    created: Vec<CreatedPlaylist>,
    appends: usize,
}

/// Destination that keeps playlists and entries in memory between runs.
#[derive(Debug, Default)]
pub struct InMemoryDestination {
    state: Mutex<DestinationState>,
}

impl InMemoryDestination {
    pub fn with_playlist(self, id: &str, name: &str, entries: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.playlists.push(Playlist::new(id, name));
            state.entries.insert(
                id.to_string(),
                entries.iter().map(|video| VideoRef::new(*video)).collect(),
            );
        }
        self
    }

    pub fn created(&self) -> Vec<CreatedPlaylist> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn appends(&self) -> usize {
        self.state.lock().unwrap().appends
    }

    /// Entries of the playlist called `name`, in insertion order.
    pub fn entries_of(&self, name: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .playlists
            .iter()
            .find(|playlist| playlist.name == name)
            .and_then(|playlist| state.entries.get(&playlist.id))
            .map(|entries| entries.iter().map(|video| video.to_string()).collect())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl CatalogWriter for InMemoryDestination {
    async fn list_playlists(&self) -> CatalogResult<Vec<Playlist>> {
        Ok(self.state.lock().unwrap().playlists.clone())
    }

    async fn create_playlist(
        &self,
        name: &str,
        description: &str,
        privacy: Privacy,
    ) -> CatalogResult<Playlist> {
        let mut state = self.state.lock().unwrap();
        let playlist = Playlist::new(format!("yt-{}", state.playlists.len() + 1), name);
        state.playlists.push(playlist.clone());
        state.entries.insert(playlist.id.clone(), vec![]);
        state.created.push(CreatedPlaylist {
            name: name.to_string(),
            description: description.to_string(),
            privacy,
        });
        Ok(playlist)
    }

    async fn list_entries(&self, playlist_id: &str) -> CatalogResult<ExistingEntrySet> {
        let state = self.state.lock().unwrap();
        Ok(state
            .entries
            .get(playlist_id)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn append_entry(&self, playlist_id: &str, video: &VideoRef) -> CatalogResult<()> {
        let mut state = self.state.lock().unwrap();
        state.appends += 1;
        state
            .entries
            .entry(playlist_id.to_string())
            .or_default()
            .push(video.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct StaticMatcher {
    hits: HashMap<String, VideoRef>,
    failing: HashSet<String>,
}

impl StaticMatcher {
    pub fn with_hit(mut self, query: &str, video: &str) -> Self {
        self.hits.insert(query.to_string(), VideoRef::new(video));
        self
    }

    pub fn with_failure(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }
}

#[async_trait::async_trait]
impl TrackMatcher for StaticMatcher {
    async fn find_match(&self, query: &str) -> CatalogResult<Option<VideoRef>> {
        if self.failing.contains(query) {
            return Err(Report::new(CatalogError::Transport)
                .attach_printable(format!("search for {query:?} failed")));
        }
        Ok(self.hits.get(query).cloned())
    }
}

/// Answers every prompt from a script. Playlists without a scripted answer
/// get `all`.
#[derive(Debug, Default)]
pub struct ScriptedSelector {
    playlists: Vec<usize>,
    tracks: HashMap<String, TrackSelection>,
}

impl ScriptedSelector {
    pub fn playlists(indices: &[usize]) -> Self {
        Self {
            playlists: indices.to_vec(),
            tracks: HashMap::new(),
        }
    }

    pub fn with_tracks(mut self, playlist: &str, selection: TrackSelection) -> Self {
        self.tracks.insert(playlist.to_string(), selection);
        self
    }
}

impl Selector for ScriptedSelector {
    fn choose_playlists(&self, _playlists: &[Playlist]) -> SelectionResult<Vec<usize>> {
        Ok(self.playlists.clone())
    }

    fn choose_tracks(
        &self,
        playlist: &Playlist,
        _tracks: &[Track],
    ) -> SelectionResult<TrackSelection> {
        Ok(self
            .tracks
            .get(&playlist.name)
            .cloned()
            .unwrap_or(TrackSelection::All))
    }
}

//! Decisions taken before anything is written to the destination.

use std::collections::{HashMap, HashSet};

use crate::catalog::{ExistingEntrySet, Playlist, VideoRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationPlan {
    Reuse(Playlist),
    Create,
    /// An earlier source playlist with the same name already owns the
    /// destination playlist in this run.
    AlreadyClaimed,
}

/// Destination playlists keyed by exact name.
#[derive(Debug, Default)]
pub struct DestinationIndex {
    by_name: HashMap<String, Playlist>,
    claimed: HashSet<String>,
}

impl DestinationIndex {
    pub fn new(playlists: Vec<Playlist>) -> Self {
        let mut by_name: HashMap<String, Playlist> = HashMap::with_capacity(playlists.len());
        for playlist in playlists {
            if let Some(kept) = by_name.get(&playlist.name) {
                log::warn!(
                    "Destination has more than one playlist named {:?}, using {}",
                    playlist.name,
                    kept.id
                );
                continue;
            }
            by_name.insert(playlist.name.clone(), playlist);
        }
        Self {
            by_name,
            claimed: HashSet::new(),
        }
    }

    /// Claims `name` for the calling source playlist.
    pub fn resolve(&mut self, name: &str) -> DestinationPlan {
        if !self.claimed.insert(name.to_string()) {
            return DestinationPlan::AlreadyClaimed;
        }
        match self.by_name.get(name) {
            Some(playlist) => DestinationPlan::Reuse(playlist.clone()),
            None => DestinationPlan::Create,
        }
    }

    pub fn record_created(&mut self, playlist: Playlist) {
        self.claimed.insert(playlist.name.clone());
        self.by_name.insert(playlist.name.clone(), playlist);
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackAction {
    Append(VideoRef),
    SkipDuplicate(VideoRef),
    SkipNoMatch,
}

pub fn decide(matched: Option<VideoRef>, existing: &ExistingEntrySet) -> TrackAction {
    match matched {
        None => TrackAction::SkipNoMatch,
        Some(video) if existing.contains(&video) => TrackAction::SkipDuplicate(video),
        Some(video) => TrackAction::Append(video),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_playlists_by_exact_name() {
        let mut index = DestinationIndex::new(vec![
            Playlist::new("yt1", "Road Trip"),
            Playlist::new("yt2", "road trip"),
        ]);
        assert_eq!(
            index.resolve("Road Trip"),
            DestinationPlan::Reuse(Playlist::new("yt1", "Road Trip"))
        );
        assert_eq!(index.resolve("Focus"), DestinationPlan::Create);
    }

    #[test]
    fn first_destination_with_a_name_wins() {
        let mut index = DestinationIndex::new(vec![
            Playlist::new("yt1", "Mix"),
            Playlist::new("yt2", "Mix"),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.resolve("Mix"),
            DestinationPlan::Reuse(Playlist::new("yt1", "Mix"))
        );
    }

    #[test]
    fn a_name_is_claimed_once_per_run() {
        let mut index = DestinationIndex::new(vec![Playlist::new("yt1", "Mix")]);
        assert!(matches!(index.resolve("Mix"), DestinationPlan::Reuse(_)));
        assert_eq!(index.resolve("Mix"), DestinationPlan::AlreadyClaimed);

        assert_eq!(index.resolve("New"), DestinationPlan::Create);
        index.record_created(Playlist::new("yt9", "New"));
        assert_eq!(index.resolve("New"), DestinationPlan::AlreadyClaimed);
    }

    #[test]
    fn decide_skips_missing_and_known_videos() {
        let existing: ExistingEntrySet = [VideoRef::new("vid1")].into_iter().collect();
        assert_eq!(decide(None, &existing), TrackAction::SkipNoMatch);
        assert_eq!(
            decide(Some(VideoRef::new("vid1")), &existing),
            TrackAction::SkipDuplicate(VideoRef::new("vid1"))
        );
        assert_eq!(
            decide(Some(VideoRef::new("vid2")), &existing),
            TrackAction::Append(VideoRef::new("vid2"))
        );
    }
}

use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Table};
use inflector::Inflector;

use crate::catalog::{Playlist, VideoRef};

#[derive(Debug, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum TrackOutcome {
    Added(VideoRef),
    Duplicate(VideoRef),
    NoMatch,
    /// The search call itself failed. Reported like a missing match.
    SearchFailed,
}

impl TrackOutcome {
    pub fn label(&self) -> String {
        self.to_string().to_sentence_case()
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, TrackOutcome::NoMatch | TrackOutcome::SearchFailed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackReport {
    pub position: usize,
    pub query: String,
    pub outcome: TrackOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum DestinationStatus {
    Created,
    Reused,
    SkippedNameConflict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistReport {
    pub source: Playlist,
    /// `None` when the playlist was skipped.
    pub destination: Option<Playlist>,
    pub status: DestinationStatus,
    pub tracks: Vec<TrackReport>,
}

impl PlaylistReport {
    pub fn added(&self) -> usize {
        self.count(|outcome| matches!(outcome, TrackOutcome::Added(_)))
    }

    pub fn duplicates(&self) -> usize {
        self.count(|outcome| matches!(outcome, TrackOutcome::Duplicate(_)))
    }

    pub fn missing(&self) -> usize {
        self.count(TrackOutcome::is_missing)
    }

    fn count(&self, predicate: impl Fn(&TrackOutcome) -> bool) -> usize {
        self.tracks
            .iter()
            .filter(|track| predicate(&track.outcome))
            .count()
    }
}

/// Everything a run did, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub playlists: Vec<PlaylistReport>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    pub fn total_added(&self) -> usize {
        self.playlists.iter().map(PlaylistReport::added).sum()
    }

    pub fn total_duplicates(&self) -> usize {
        self.playlists.iter().map(PlaylistReport::duplicates).sum()
    }

    pub fn total_missing(&self) -> usize {
        self.playlists.iter().map(PlaylistReport::missing).sum()
    }

    pub fn created_playlists(&self) -> usize {
        self.playlists
            .iter()
            .filter(|playlist| playlist.status == DestinationStatus::Created)
            .count()
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            "Playlist",
            "Destination",
            "Added",
            "Duplicates",
            "Not found",
        ]);
        for playlist in &self.playlists {
            table.add_row(vec![
                Cell::new(&playlist.source.name),
                Cell::new(playlist.status.to_string().to_sentence_case()),
                Cell::new(playlist.added()),
                Cell::new(playlist.duplicates()),
                Cell::new(playlist.missing()),
            ]);
        }
        table.add_row(vec![
            Cell::new("Total"),
            Cell::new(format!("{} created", self.created_playlists())),
            Cell::new(self.total_added()),
            Cell::new(self.total_duplicates()),
            Cell::new(self.total_missing()),
        ]);
        table
    }

    pub fn print(&self) {
        if self.is_empty() {
            println!("{}", "No playlists were selected, nothing to transfer".yellow());
            return;
        }
        println!("\n{}", self.to_table());
        for playlist in &self.playlists {
            let missing = playlist
                .tracks
                .iter()
                .filter(|track| track.outcome.is_missing())
                .collect::<Vec<_>>();
            if missing.is_empty() {
                continue;
            }
            println!(
                "\n{} {}",
                "Not found on YouTube for".yellow(),
                playlist.source.name.yellow().bold()
            );
            for track in missing {
                println!(
                    "  {}. {} ({})",
                    track.position,
                    track.query,
                    track.outcome.label()
                );
            }
        }
    }
}

use std::time::Duration;

use colored::Colorize;
use error_stack::{IntoReport, ResultExt};
use indicatif::{ProgressBar, ProgressStyle};

use crate::catalog::{
    CatalogReader, CatalogWriter, ExistingEntrySet, Playlist, Privacy, Track, TrackMatcher,
    IMPORT_DESCRIPTION,
};
use crate::selection::{pick, Selector};
use crate::sync::plan::{decide, DestinationIndex, DestinationPlan, TrackAction};
use crate::sync::report::{
    DestinationStatus, PlaylistReport, SyncReport, TrackOutcome, TrackReport,
};
use crate::sync::{SyncError, SyncResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Wait after every append to the destination.
    pub pause: Duration,
    pub privacy: Privacy,
    pub description: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            pause: Duration::from_secs(1),
            privacy: Privacy::default(),
            description: IMPORT_DESCRIPTION.to_string(),
        }
    }
}

/// Copies the selected source playlists into the destination, one track at a
/// time. Every platform call is awaited in order.
pub struct SyncEngine<'a, R, W, M, S> {
    reader: &'a R,
    writer: &'a W,
    matcher: &'a M,
    selector: &'a S,
    options: SyncOptions,
}

impl<'a, R, W, M, S> SyncEngine<'a, R, W, M, S>
where
    R: CatalogReader,
    W: CatalogWriter,
    M: TrackMatcher,
    S: Selector,
{
    pub fn new(
        reader: &'a R,
        writer: &'a W,
        matcher: &'a M,
        selector: &'a S,
        options: SyncOptions,
    ) -> Self {
        Self {
            reader,
            writer,
            matcher,
            selector,
            options,
        }
    }

    pub async fn run(&self) -> SyncResult<SyncReport> {
        let playlists = self
            .reader
            .list_playlists()
            .await
            .change_context(SyncError)
            .attach_printable("Failed to list the Spotify playlists")?;
        if playlists.is_empty() {
            println!("{}", "No playlists found on Spotify".yellow());
            return Ok(SyncReport::default());
        }

        let chosen = self
            .selector
            .choose_playlists(&playlists)
            .change_context(SyncError)?;
        let selected = pick(&playlists, &chosen).change_context(SyncError)?;
        if selected.is_empty() {
            log::info!("No playlists selected");
            return Ok(SyncReport::default());
        }

        let existing_playlists = self
            .writer
            .list_playlists()
            .await
            .change_context(SyncError)
            .attach_printable("Failed to list the YouTube playlists")?;
        let mut destinations = DestinationIndex::new(existing_playlists);
        log::debug!("{} destination playlists indexed by name", destinations.len());

        let mut report = SyncReport::default();
        for source in &selected {
            let playlist_report = self.transfer_playlist(source, &mut destinations).await?;
            report.playlists.push(playlist_report);
        }
        Ok(report)
    }

    async fn transfer_playlist(
        &self,
        source: &Playlist,
        destinations: &mut DestinationIndex,
    ) -> SyncResult<PlaylistReport> {
        let (destination, status) = match destinations.resolve(&source.name) {
            DestinationPlan::AlreadyClaimed => {
                log::warn!(
                    "Skipping {} ({}): another selected playlist already uses the name",
                    source.name,
                    source.id
                );
                println!(
                    "{} {}",
                    "Skipping duplicate playlist name".yellow(),
                    source.name.yellow().bold()
                );
                return Ok(PlaylistReport {
                    source: source.clone(),
                    destination: None,
                    status: DestinationStatus::SkippedNameConflict,
                    tracks: vec![],
                });
            }
            DestinationPlan::Reuse(playlist) => {
                println!(
                    "{} {}",
                    "Using existing YouTube playlist".cyan(),
                    playlist.name.cyan().bold()
                );
                (playlist, DestinationStatus::Reused)
            }
            DestinationPlan::Create => {
                let playlist = self
                    .writer
                    .create_playlist(
                        &source.name,
                        &self.options.description,
                        self.options.privacy,
                    )
                    .await
                    .change_context(SyncError)
                    .attach_printable_lazy(|| {
                        format!("Failed to create the YouTube playlist {}", source.name)
                    })?;
                println!(
                    "{} {}",
                    "Created YouTube playlist".green(),
                    playlist.name.green().bold()
                );
                destinations.record_created(playlist.clone());
                (playlist, DestinationStatus::Created)
            }
        };

        let tracks = self
            .reader
            .list_tracks(&source.id)
            .await
            .change_context(SyncError)
            .attach_printable_lazy(|| format!("Failed to list the tracks of {}", source.name))?;
        let selected = if tracks.is_empty() {
            println!("{} has no tracks", source.name);
            vec![]
        } else {
            self.selector
                .choose_tracks(source, &tracks)
                .change_context(SyncError)?
                .resolve(&tracks)
                .change_context(SyncError)?
        };

        let mut reports = Vec::with_capacity(selected.len());
        if !selected.is_empty() {
            let mut existing = self
                .writer
                .list_entries(&destination.id)
                .await
                .change_context(SyncError)
                .attach_printable_lazy(|| {
                    format!("Failed to list the entries of {}", destination.name)
                })?;
            log::debug!(
                "{} already holds {} videos",
                destination.name,
                existing.len()
            );

            let progress = ProgressBar::new(selected.len() as u64);
            progress.set_style(
                ProgressStyle::default_bar()
                    .template("{msg} [{wide_bar:.white/blue}] {pos}/{len}")
                    .into_report()
                    .change_context(SyncError)?
                    .progress_chars("█  "),
            );
            progress.set_message(destination.name.clone());
            for track in selected {
                let outcome = self
                    .transfer_track(&destination, &track, &mut existing)
                    .await?;
                progress.suspend(|| print_outcome(&track, &outcome));
                progress.inc(1);
                reports.push(TrackReport {
                    position: track.position,
                    query: track.query(),
                    outcome,
                });
            }
            progress.finish_and_clear();
        }

        Ok(PlaylistReport {
            source: source.clone(),
            destination: Some(destination),
            status,
            tracks: reports,
        })
    }

    async fn transfer_track(
        &self,
        destination: &Playlist,
        track: &Track,
        existing: &mut ExistingEntrySet,
    ) -> SyncResult<TrackOutcome> {
        let query = track.query();
        let matched = match self.matcher.find_match(&query).await {
            Ok(matched) => matched,
            Err(report) => {
                log::warn!("Search for {query:?} failed, skipping it: {report:?}");
                return Ok(TrackOutcome::SearchFailed);
            }
        };

        match decide(matched, existing) {
            TrackAction::SkipNoMatch => {
                log::info!("No YouTube match for {query:?}");
                Ok(TrackOutcome::NoMatch)
            }
            TrackAction::SkipDuplicate(video) => {
                log::info!("{query:?} is already in {} as {video}", destination.name);
                Ok(TrackOutcome::Duplicate(video))
            }
            TrackAction::Append(video) => {
                self.writer
                    .append_entry(&destination.id, &video)
                    .await
                    .change_context(SyncError)
                    .attach_printable_lazy(|| {
                        format!("Failed to add {video} to {}", destination.name)
                    })?;
                log::info!("Added {query:?} to {} as {video}", destination.name);
                existing.insert(video.clone());
                tokio::time::sleep(self.options.pause).await;
                Ok(TrackOutcome::Added(video))
            }
        }
    }
}

fn print_outcome(track: &Track, outcome: &TrackOutcome) {
    let line = format!("{}. {}", track.position, track.query());
    match outcome {
        TrackOutcome::Added(video) => println!("{} {line} ({video})", "Added".green()),
        TrackOutcome::Duplicate(_) => println!("{} {}", "Already there".blue(), line),
        TrackOutcome::NoMatch | TrackOutcome::SearchFailed => {
            println!("{} {}", outcome.label().yellow(), line)
        }
    }
}

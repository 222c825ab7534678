use std::collections::HashSet;
use std::fmt;

use error_stack::Report;

use crate::catalog::{Playlist, Track};

pub mod console;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    Prompt,
    InvalidNumber,
    OutOfRange,
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::Prompt => f.write_str("Selection prompt error"),
            SelectionError::InvalidNumber => f.write_str("Selection is not a list of numbers"),
            SelectionError::OutOfRange => f.write_str("Selection is out of range"),
        }
    }
}

impl std::error::Error for SelectionError {}

pub type SelectionResult<T> = error_stack::Result<T, SelectionError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSelection {
    All,
    /// 1-based indices over the listed tracks, in the order they were chosen.
    Indices(Vec<usize>),
}

impl TrackSelection {
    pub fn resolve(&self, tracks: &[Track]) -> SelectionResult<Vec<Track>> {
        match self {
            TrackSelection::All => Ok(tracks.to_vec()),
            TrackSelection::Indices(indices) => pick(tracks, indices),
        }
    }
}

/// Chooses what gets transferred. Indices handed back are 1-based over the
/// slice that was offered; an empty answer means nothing is transferred.
#[cfg_attr(test, mockall::automock)]
pub trait Selector {
    fn choose_playlists(&self, playlists: &[Playlist]) -> SelectionResult<Vec<usize>>;
    fn choose_tracks(&self, playlist: &Playlist, tracks: &[Track])
        -> SelectionResult<TrackSelection>;
}

/// Maps 1-based indices back to `items`. Repeated indices keep their first
/// occurrence only.
pub fn pick<T: Clone>(items: &[T], indices: &[usize]) -> SelectionResult<Vec<T>> {
    let mut seen = HashSet::new();
    let mut picked = Vec::with_capacity(indices.len());
    for &index in indices {
        if index == 0 || index > items.len() {
            return Err(Report::new(SelectionError::OutOfRange).attach_printable(format!(
                "{} is not between 1 and {}",
                index,
                items.len()
            )));
        }
        if !seen.insert(index) {
            log::warn!("Index {index} was selected more than once, keeping the first one");
            continue;
        }
        picked.push(items[index - 1].clone());
    }
    Ok(picked)
}

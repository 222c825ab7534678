use colored::Colorize;
use error_stack::{IntoReport, ResultExt};

use crate::catalog::{Playlist, Track};
use crate::dialoguer::Dialoguer;
use crate::selection::{SelectionError, SelectionResult, Selector, TrackSelection};

const ALL_TOKEN: &str = "all";

/// Numbered listings on stdout, comma separated answers on the prompt.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSelector;

impl Selector for ConsoleSelector {
    fn choose_playlists(&self, playlists: &[Playlist]) -> SelectionResult<Vec<usize>> {
        println!("\n{}", "Available Spotify playlists:".cyan().bold());
        for (index, playlist) in playlists.iter().enumerate() {
            println!("{}. {}", index + 1, playlist.name);
        }
        let answer = Dialoguer::input(
            "Enter the numbers of the playlists you want to transfer (comma-separated)".to_string(),
        )
        .change_context(SelectionError::Prompt)?;
        parse_indices(&answer)
    }

    fn choose_tracks(
        &self,
        playlist: &Playlist,
        tracks: &[Track],
    ) -> SelectionResult<TrackSelection> {
        println!("\n{} {}", "Songs in".cyan().bold(), playlist.name.cyan().bold());
        for track in tracks {
            println!("{}. {}", track.position, track.query());
        }
        println!("\nEnter '{}' to transfer all songs.", ALL_TOKEN.green());
        let answer = Dialoguer::input(
            "Enter the numbers of the songs you want to transfer (comma-separated)".to_string(),
        )
        .change_context(SelectionError::Prompt)?;
        parse_track_selection(&answer)
    }
}

/// Parses `"1, 3,2"` into `[1, 3, 2]`. Blank input selects nothing.
pub fn parse_indices(input: &str) -> SelectionResult<Vec<usize>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(vec![]);
    }
    input
        .split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<usize>()
                .into_report()
                .change_context(SelectionError::InvalidNumber)
                .attach_printable_lazy(|| format!("'{token}' is not a number"))
        })
        .collect()
}

pub fn parse_track_selection(input: &str) -> SelectionResult<TrackSelection> {
    if input.trim().eq_ignore_ascii_case(ALL_TOKEN) {
        return Ok(TrackSelection::All);
    }
    parse_indices(input).map(TrackSelection::Indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_numbers() {
        assert_eq!(parse_indices("1,3,2").unwrap(), vec![1, 3, 2]);
        assert_eq!(parse_indices(" 4 , 1 ").unwrap(), vec![4, 1]);
    }

    #[test]
    fn blank_input_selects_nothing() {
        assert!(parse_indices("").unwrap().is_empty());
        assert!(parse_indices("   ").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_numeric_tokens() {
        for input in ["1,two", "1,,2", "-1", "all"] {
            let report = parse_indices(input).unwrap_err();
            assert_eq!(*report.current_context(), SelectionError::InvalidNumber, "{input}");
        }
    }

    #[test]
    fn all_token_is_case_insensitive() {
        assert_eq!(parse_track_selection("all").unwrap(), TrackSelection::All);
        assert_eq!(parse_track_selection(" ALL ").unwrap(), TrackSelection::All);
        assert_eq!(
            parse_track_selection("2,1").unwrap(),
            TrackSelection::Indices(vec![2, 1])
        );
    }
}

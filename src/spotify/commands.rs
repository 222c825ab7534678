use colored::Colorize;
use error_stack::ResultExt;

use crate::auth::spotify_auth::SpotifyAuth;
use crate::catalog::CatalogReader;
use crate::config::AppConfig;
use crate::spotify::api::SpotifyClient;
use crate::spotify::{SpotifyError, SpotifyResult};

pub struct PlaylistsCommands;

impl PlaylistsCommands {
    pub async fn execute() -> SpotifyResult<()> {
        let config = AppConfig::from_env().change_context(SpotifyError)?;
        let token = SpotifyAuth::new(&config.spotify)
            .login()
            .await
            .change_context(SpotifyError)?;
        let playlists = SpotifyClient::new(token)
            .list_playlists()
            .await
            .change_context(SpotifyError)?;

        if playlists.is_empty() {
            println!("{}", "No playlists found on Spotify".yellow());
            return Ok(());
        }
        println!("{}", "Spotify playlists:".cyan().bold());
        for (index, playlist) in playlists.iter().enumerate() {
            println!("{}. {}", index + 1, playlist.name);
        }
        Ok(())
    }
}

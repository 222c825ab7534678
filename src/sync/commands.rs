use std::time::Duration;

use clap::Args;
use colored::Colorize;
use error_stack::ResultExt;

use crate::auth::spotify_auth::SpotifyAuth;
use crate::auth::youtube_auth::YoutubeAuth;
use crate::catalog::Privacy;
use crate::config::AppConfig;
use crate::selection::console::ConsoleSelector;
use crate::spotify::api::SpotifyClient;
use crate::sync::engine::{SyncEngine, SyncOptions};
use crate::sync::{SyncError, SyncResult};
use crate::youtube::api::YoutubeClient;

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TransferArgs {
    /// Milliseconds to wait after each video added to YouTube
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1000..))]
    pub pause_ms: u64,
    /// Privacy of the playlists created on YouTube
    #[arg(long, value_enum, default_value_t = Privacy::Public)]
    pub privacy: Privacy,
}

impl TransferArgs {
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            pause: Duration::from_millis(self.pause_ms),
            privacy: self.privacy,
            ..SyncOptions::default()
        }
    }
}

pub struct TransferCommands;

impl TransferCommands {
    pub async fn execute(args: &TransferArgs) -> SyncResult<()> {
        let config = AppConfig::from_env().change_context(SyncError)?;

        println!("{}", "Log in to Spotify in the browser window".cyan());
        let spotify_token = SpotifyAuth::new(&config.spotify)
            .login()
            .await
            .change_context(SyncError)?;
        println!("{}", "Log in to YouTube in the browser window".cyan());
        let youtube_token = YoutubeAuth::from_file(&config.youtube_client_secrets)
            .change_context(SyncError)?
            .login()
            .await
            .change_context(SyncError)?;

        let spotify = SpotifyClient::new(spotify_token);
        let youtube = YoutubeClient::new(youtube_token);
        let selector = ConsoleSelector;
        let report = SyncEngine::new(&spotify, &youtube, &youtube, &selector, args.sync_options())
            .run()
            .await?;

        report.print();
        if !report.is_empty() {
            println!(
                "\n{} {} videos added",
                "Transfer finished:".green().bold(),
                report.total_added()
            );
        }
        Ok(())
    }
}

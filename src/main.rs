use std::fmt;

use clap::{Parser, Subcommand};
use colored::Colorize;
use error_stack::fmt::{Charset, ColorMode};
use error_stack::{FutureExt, Report, ResultExt};

use crate::config::AppConfig;
use crate::logging::init_logging;
use crate::spotify::commands::PlaylistsCommands;
use crate::sync::commands::{TransferArgs, TransferCommands};

mod auth;
mod catalog;
mod config;
mod dialoguer;
mod logging;
mod retry;
mod selection;
mod spotify;
mod sync;
#[cfg(test)]
mod test_utils;
mod youtube;

#[derive(Debug)]
pub struct BridgeError;
impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Playlist bridge error")
    }
}
impl std::error::Error for BridgeError {}

pub type BridgeResult<T> = error_stack::Result<T, BridgeError>;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Copy Spotify playlists to YouTube")]
struct Cli {
    /// More output on stderr, repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: BridgeCommands,
}

#[derive(Subcommand, Debug, PartialEq, Clone)]
enum BridgeCommands {
    /// Pick Spotify playlists and songs and add them to YouTube playlists of the same name
    Transfer(TransferArgs),
    /// List the Spotify playlists of the logged in user
    Playlists,
    /// Print the configuration read from the environment
    Config,
}

impl BridgeCommands {
    pub async fn execute(&self) -> BridgeResult<()> {
        match self {
            BridgeCommands::Transfer(args) => TransferCommands::execute(args)
                .change_context(BridgeError)
                .await
                .attach(Suggestion(format!(
                    "run `{}` again, existing playlists are reused and added songs are skipped",
                    self.cli_command()
                ))),
            BridgeCommands::Playlists => {
                PlaylistsCommands::execute()
                    .change_context(BridgeError)
                    .await
            }
            BridgeCommands::Config => {
                let config = AppConfig::from_env().change_context(BridgeError)?;
                println!("{}\n{config}", "Current config:".cyan().bold());
                Ok(())
            }
        }
    }

    pub fn cli_command(&self) -> String {
        match self {
            BridgeCommands::Transfer(args) => format!(
                "playlist-bridge transfer --pause-ms {} --privacy {}",
                args.pause_ms, args.privacy
            ),
            BridgeCommands::Playlists => "playlist-bridge playlists".to_string(),
            BridgeCommands::Config => "playlist-bridge config".to_string(),
        }
    }
}

pub struct Suggestion(String);

impl Suggestion {
    pub fn set_report() {
        Report::set_charset(Charset::Utf8);
        Report::set_color_mode(ColorMode::Color);
        Report::install_debug_hook::<Self>(|Self(value), context| {
            context.push_body(format!("{}: {value}", "suggestion".yellow()))
        });
    }
}

async fn run() -> BridgeResult<()> {
    let cli = Cli::parse();

    Suggestion::set_report();
    init_logging(cli.verbose).change_context(BridgeError)?;

    cli.command.execute().await
}

#[tokio::main]
async fn main() -> BridgeResult<()> {
    run().await
}

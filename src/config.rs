use std::fmt;
use std::path::PathBuf;

use error_stack::{IntoReport, Report, ResultExt};
use url::Url;

use crate::Suggestion;

#[derive(Debug)]
pub struct ConfigError;

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Config error")
    }
}

impl std::error::Error for ConfigError {}

pub type ConfigResult<T> = error_stack::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// `AppConfig` holds the identity values both platforms need. Everything is
/// read from the environment (a `.env` file is loaded first when present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub spotify: SpotifyCredentials,
    /// Google OAuth client file for the YouTube Data API.
    pub youtube_client_secrets: PathBuf,
}

impl AppConfig {
    pub const SPOTIFY_SCOPES: [&'static str; 2] =
        ["playlist-read-private", "playlist-read-collaborative"];
    pub const YOUTUBE_SCOPES: [&'static str; 1] =
        ["https://www.googleapis.com/auth/youtube.force-ssl"];

    const CLIENT_ID_VARS: [&'static str; 2] = ["SPOTIFY_CLIENT_ID", "SPOTIPY_CLIENT_ID"];
    const CLIENT_SECRET_VARS: [&'static str; 2] =
        ["SPOTIFY_CLIENT_SECRET", "SPOTIPY_CLIENT_SECRET"];
    const REDIRECT_URI_VARS: [&'static str; 2] = ["SPOTIFY_REDIRECT_URI", "SPOTIPY_REDIRECT_URI"];
    const YOUTUBE_SECRETS_VAR: &'static str = "YOUTUBE_CLIENT_SECRETS";
    const DEFAULT_YOUTUBE_SECRETS: &'static str = "client_secret.json";

    pub fn from_env() -> ConfigResult<Self> {
        if let Err(err) = dotenvy::dotenv() {
            log::debug!("No .env file loaded: {err}");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = Self::required(&lookup, &Self::CLIENT_ID_VARS)?;
        let client_secret = Self::required(&lookup, &Self::CLIENT_SECRET_VARS)?;
        let redirect_uri = Self::required(&lookup, &Self::REDIRECT_URI_VARS)?;
        Url::parse(&redirect_uri)
            .into_report()
            .change_context(ConfigError)
            .attach_printable_lazy(|| format!("{} is not a valid url", Self::REDIRECT_URI_VARS[0]))?;
        let youtube_client_secrets = lookup(Self::YOUTUBE_SECRETS_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_YOUTUBE_SECRETS.to_string());

        Ok(Self {
            spotify: SpotifyCredentials {
                client_id,
                client_secret,
                redirect_uri,
            },
            youtube_client_secrets: PathBuf::from(youtube_client_secrets),
        })
    }

    /// First non-empty value among `names`, the preferred name first.
    fn required<F>(lookup: &F, names: &[&str]) -> ConfigResult<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        names
            .iter()
            .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()))
            .ok_or_else(|| {
                Report::new(ConfigError)
                    .attach_printable(format!("{} environment variable not set", names[0]))
                    .attach(Suggestion(format!(
                        "add {}=... to a .env file in the working directory",
                        names[0]
                    )))
            })
    }
}

impl fmt::Display for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Spotify client id:      {}", self.spotify.client_id)?;
        writeln!(f, "Spotify client secret:  {}", mask(&self.spotify.client_secret))?;
        writeln!(f, "Spotify redirect uri:   {}", self.spotify.redirect_uri)?;
        writeln!(f, "Spotify scopes:         {}", Self::SPOTIFY_SCOPES.join(" "))?;
        writeln!(
            f,
            "YouTube client secrets: {}",
            self.youtube_client_secrets.display()
        )?;
        write!(f, "YouTube scopes:         {}", Self::YOUTUBE_SCOPES.join(" "))
    }
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}****")
}

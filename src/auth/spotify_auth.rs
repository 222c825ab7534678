use crate::auth::callback::CallbackListener;
use crate::auth::{AccessToken, AuthResult, OAuthApp};
use crate::config::{AppConfig, SpotifyCredentials};

const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

pub struct SpotifyAuth {
    app: OAuthApp,
    redirect_uri: String,
}

impl SpotifyAuth {
    pub fn new(credentials: &SpotifyCredentials) -> Self {
        Self {
            app: OAuthApp {
                provider: "Spotify",
                client_id: credentials.client_id.clone(),
                client_secret: credentials.client_secret.clone(),
                auth_url: SPOTIFY_AUTH_URL.to_string(),
                token_url: SPOTIFY_TOKEN_URL.to_string(),
                scopes: AppConfig::SPOTIFY_SCOPES
                    .iter()
                    .map(|scope| scope.to_string())
                    .collect(),
            },
            redirect_uri: credentials.redirect_uri.clone(),
        }
    }

    /// Spotify only redirects to the registered uri, so the listener binds exactly that.
    pub async fn login(&self) -> AuthResult<AccessToken> {
        let listener = CallbackListener::bind_redirect(&self.redirect_uri)?;
        self.app.authorize(listener).await
    }
}

use std::fmt;
use std::time::Duration;

use colored::Colorize;
use error_stack::{Report, ResultExt};
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    RedirectUrl, Scope, TokenResponse, TokenUrl,
};

use crate::auth::callback::CallbackListener;

pub mod callback;
pub mod spotify_auth;
pub mod youtube_auth;

/// How long the loopback listener waits for the browser redirect.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug)]
pub struct AuthError;

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Authentication error")
    }
}

impl std::error::Error for AuthError {}

pub type AuthResult<T> = error_stack::Result<T, AuthError>;

/// Bearer token handed to the platform clients. Held in memory only.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(****)")
    }
}

/// Endpoints and credentials of one OAuth provider.
#[derive(Debug, Clone)]
pub struct OAuthApp {
    pub provider: &'static str,
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
}

impl OAuthApp {
    fn client(&self, redirect_uri: &str) -> AuthResult<BasicClient> {
        let auth_url = AuthUrl::new(self.auth_url.clone())
            .map_err(|err| Report::new(AuthError).attach_printable(err.to_string()))?;
        let token_url = TokenUrl::new(self.token_url.clone())
            .map_err(|err| Report::new(AuthError).attach_printable(err.to_string()))?;
        let redirect_url = RedirectUrl::new(redirect_uri.to_string())
            .map_err(|err| Report::new(AuthError).attach_printable(err.to_string()))?;
        Ok(BasicClient::new(
            ClientId::new(self.client_id.clone()),
            Some(ClientSecret::new(self.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_redirect_uri(redirect_url))
    }

    /// Authorization code flow with PKCE: opens the browser, waits for the
    /// redirect on `listener` and exchanges the code.
    pub async fn authorize(&self, listener: CallbackListener) -> AuthResult<AccessToken> {
        let client = self.client(listener.redirect_uri())?;
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf_token) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .set_pkce_challenge(pkce_challenge)
            .url();

        println!(
            "{}",
            format!("Opening the browser to log in to {}...", self.provider).cyan()
        );
        println!(
            "If the browser doesn't open, visit: {}",
            auth_url.to_string().blue()
        );
        if webbrowser::open(auth_url.as_str()).is_err() {
            println!("{}", "Failed to open the browser automatically".yellow());
        }

        let params = listener.wait_for_code(CALLBACK_TIMEOUT).await?;
        if params.state != *csrf_token.secret() {
            return Err(Report::new(AuthError)
                .attach_printable(format!("{} returned an unexpected state", self.provider)));
        }

        log::debug!("Exchanging the {} authorization code", self.provider);
        let token = client
            .exchange_code(AuthorizationCode::new(params.code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(async_http_client)
            .await
            .map_err(|err| Report::new(AuthError).attach_printable(err.to_string()))
            .attach_printable_lazy(|| format!("{} token exchange failed", self.provider))?;

        println!("{}", format!("Logged in to {}", self.provider).green());
        Ok(AccessToken::new(token.access_token().secret().clone()))
    }
}

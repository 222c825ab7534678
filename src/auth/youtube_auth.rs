use std::fs;
use std::path::Path;

use error_stack::{IntoReport, Report, ResultExt};
use serde::Deserialize;

use crate::auth::callback::CallbackListener;
use crate::auth::{AccessToken, AuthError, AuthResult, OAuthApp};
use crate::config::AppConfig;
use crate::Suggestion;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Deserialize, Debug)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

/// OAuth client downloaded from the Google Cloud console.
#[derive(Deserialize, Debug, Clone)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URL.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

impl ClientSecrets {
    pub fn parse(content: &str) -> AuthResult<Self> {
        let file: ClientSecretsFile = serde_json::from_str(content)
            .into_report()
            .change_context(AuthError)
            .attach_printable("Client secrets file is not valid JSON")?;
        file.installed.or(file.web).ok_or_else(|| {
            Report::new(AuthError)
                .attach_printable("Client secrets file has neither an `installed` nor a `web` client")
        })
    }

    pub fn from_file(path: &Path) -> AuthResult<Self> {
        let content = fs::read_to_string(path)
            .into_report()
            .change_context(AuthError)
            .attach_printable_lazy(|| format!("Failed to read {}", path.display()))
            .attach(Suggestion(
                "Download an OAuth desktop client from the Google Cloud console and set YOUTUBE_CLIENT_SECRETS to its path"
                    .to_string(),
            ))?;
        Self::parse(&content)
    }
}

pub struct YoutubeAuth {
    app: OAuthApp,
}

impl YoutubeAuth {
    pub fn new(secrets: ClientSecrets) -> Self {
        Self {
            app: OAuthApp {
                provider: "YouTube",
                client_id: secrets.client_id,
                client_secret: secrets.client_secret,
                auth_url: secrets.auth_uri,
                token_url: secrets.token_uri,
                scopes: AppConfig::YOUTUBE_SCOPES
                    .iter()
                    .map(|scope| scope.to_string())
                    .collect(),
            },
        }
    }

    pub fn from_file(path: &Path) -> AuthResult<Self> {
        Ok(Self::new(ClientSecrets::from_file(path)?))
    }

    /// Installed apps may redirect to any loopback port.
    pub async fn login(&self) -> AuthResult<AccessToken> {
        let listener = CallbackListener::bind_loopback()?;
        self.app.authorize(listener).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_installed_client() {
        let secrets = ClientSecrets::parse(
            r#"{"installed":{"client_id":"abc.apps.googleusercontent.com","client_secret":"shh",
                "auth_uri":"https://accounts.google.com/o/oauth2/auth",
                "token_uri":"https://oauth2.googleapis.com/token",
                "redirect_uris":["http://localhost"]}}"#,
        )
        .unwrap();
        assert_eq!(secrets.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(secrets.client_secret, "shh");
        assert_eq!(secrets.token_uri, GOOGLE_TOKEN_URL);
    }

    #[test]
    fn falls_back_to_web_client_and_default_endpoints() {
        let secrets = ClientSecrets::parse(r#"{"web":{"client_id":"web-id","client_secret":"s"}}"#)
            .unwrap();
        assert_eq!(secrets.client_id, "web-id");
        assert_eq!(secrets.auth_uri, GOOGLE_AUTH_URL);
    }

    #[test]
    fn rejects_files_without_a_client() {
        assert!(ClientSecrets::parse(r#"{"other":{}}"#).is_err());
        assert!(ClientSecrets::parse("nope").is_err());
    }

    #[test]
    fn requests_the_force_ssl_scope() {
        let auth = YoutubeAuth::new(ClientSecrets {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            auth_uri: default_auth_uri(),
            token_uri: default_token_uri(),
        });
        assert_eq!(
            auth.app.scopes,
            vec!["https://www.googleapis.com/auth/youtube.force-ssl"]
        );
    }
}

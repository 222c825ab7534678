use std::net::SocketAddr;
use std::time::Duration;

use colored::Colorize;
use error_stack::{IntoReport, Report, ResultExt};
use tiny_http::{Header, Response, Server};
use url::Url;

use crate::auth::{AuthError, AuthResult};

const SUCCESS_PAGE: &str = r#"<html>
<head><title>Authentication Successful</title></head>
<body style="font-family: sans-serif; text-align: center; margin-top: 20vh">
<h1>Authentication Successful!</h1>
<p>You can close this window and return to the terminal.</p>
</body>
</html>"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

impl CallbackParams {
    /// Reads the redirect request target (`/callback?code=..&state=..`).
    /// `None` means the request is not the redirect and should be ignored.
    pub fn from_request_url(request_url: &str, expected_path: &str) -> Option<AuthResult<Self>> {
        let url = Url::parse("http://localhost")
            .and_then(|base| base.join(request_url))
            .ok()?;
        if url.path() != expected_path {
            return None;
        }
        let mut code = None;
        let mut state = None;
        let mut error = None;
        for (key, value) in url.query_pairs() {
            match &*key {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                _ => {}
            }
        }
        if let Some(error) = error {
            return Some(Err(Report::new(AuthError)
                .attach_printable(format!("Authorization was refused: {error}"))));
        }
        let code = code?;
        Some(Ok(Self {
            code,
            state: state.unwrap_or_default(),
        }))
    }
}

/// Loopback HTTP listener that receives the OAuth redirect.
pub struct CallbackListener {
    server: Server,
    redirect_uri: String,
    path: String,
}

impl CallbackListener {
    /// Binds the host and port named by a fixed redirect uri.
    pub fn bind_redirect(redirect_uri: &str) -> AuthResult<Self> {
        let url = Url::parse(redirect_uri)
            .into_report()
            .change_context(AuthError)
            .attach_printable_lazy(|| format!("Invalid redirect uri {redirect_uri}"))?;
        let host = url.host_str().unwrap_or("127.0.0.1");
        let port = url.port_or_known_default().unwrap_or(80);
        let server = Server::http(format!("{host}:{port}")).map_err(|err| {
            Report::new(AuthError).attach_printable(format!("Failed to listen on {host}:{port}: {err}"))
        })?;
        Ok(Self {
            server,
            redirect_uri: redirect_uri.to_string(),
            path: url.path().to_string(),
        })
    }

    /// Binds an ephemeral port on 127.0.0.1, for providers that accept any loopback port.
    pub fn bind_loopback() -> AuthResult<Self> {
        let server = Server::http("127.0.0.1:0").map_err(|err| {
            Report::new(AuthError).attach_printable(format!("Failed to open a loopback port: {err}"))
        })?;
        let address: SocketAddr = server
            .server_addr()
            .to_ip()
            .ok_or(AuthError)
            .into_report()
            .attach_printable("Loopback listener has no ip address")?;
        Ok(Self {
            server,
            redirect_uri: format!("http://127.0.0.1:{}", address.port()),
            path: "/".to_string(),
        })
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub async fn wait_for_code(&self, timeout: Duration) -> AuthResult<CallbackParams> {
        log::info!("Waiting for the authentication callback on {}", self.redirect_uri);
        let start = std::time::Instant::now();

        loop {
            if start.elapsed() > timeout {
                println!("{}", "Authentication timeout!".red());
                return Err(Report::new(AuthError).attach_printable("Timed out waiting for the browser"));
            }

            if let Ok(Some(request)) = self.server.recv_timeout(Duration::from_millis(100)) {
                match CallbackParams::from_request_url(request.url(), &self.path) {
                    Some(result) => {
                        let body = if result.is_ok() {
                            SUCCESS_PAGE
                        } else {
                            "<h1>Authentication failed</h1>"
                        };
                        let content_type = Header::from_bytes(&b"Content-Type"[..], &b"text/html"[..])
                            .map_err(|_| Report::new(AuthError))?;
                        let response = Response::from_string(body).with_header(content_type);
                        let _ = request.respond(response);
                        return result;
                    }
                    None => {
                        let response = Response::from_string("Not Found").with_status_code(404);
                        let _ = request.respond(response);
                    }
                }
            } else {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_code_and_state() {
        let params = CallbackParams::from_request_url("/callback?code=abc%2F1&state=xyz", "/callback")
            .unwrap()
            .unwrap();
        assert_eq!(
            params,
            CallbackParams {
                code: "abc/1".to_string(),
                state: "xyz".to_string(),
            }
        );
    }

    #[test]
    fn ignores_other_paths_and_requests_without_code() {
        assert!(CallbackParams::from_request_url("/favicon.ico", "/callback").is_none());
        assert!(CallbackParams::from_request_url("/callback?state=xyz", "/callback").is_none());
    }

    #[test]
    fn refused_authorization_is_an_error() {
        let result = CallbackParams::from_request_url("/?error=access_denied&state=xyz", "/").unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn loopback_listener_uses_an_ephemeral_port() {
        let listener = CallbackListener::bind_loopback().unwrap();
        assert!(listener.redirect_uri().starts_with("http://127.0.0.1:"));
        assert!(!listener.redirect_uri().ends_with(":0"));
    }
}

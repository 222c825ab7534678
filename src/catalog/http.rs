use error_stack::{IntoReport, Report, ResultExt};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::catalog::{CatalogError, CatalogResult};

const RATE_LIMIT_REASONS: [&str; 2] = ["rateLimitExceeded", "userRateLimitExceeded"];

#[derive(Deserialize, Debug, Default)]
struct ApiErrorBody {
    #[serde(default)]
    error: ApiErrorDetail,
}

#[derive(Deserialize, Debug, Default)]
struct ApiErrorDetail {
    #[serde(default)]
    errors: Vec<ApiErrorReason>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorReason {
    reason: String,
}

pub async fn send(request: RequestBuilder, description: &str) -> CatalogResult<Response> {
    request
        .send()
        .await
        .into_report()
        .change_context(CatalogError::Transport)
        .attach_printable_lazy(|| format!("Request failed: {description}"))
}

/// Decodes a successful body, or turns the status into the matching catalog error.
pub async fn read_json<T: DeserializeOwned>(
    response: Response,
    description: &str,
) -> CatalogResult<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .into_report()
            .change_context(CatalogError::Transport)
            .attach_printable_lazy(|| format!("Unexpected response body for {description}"));
    }
    let body = response.text().await.unwrap_or_default();
    Err(Report::new(classify(status, &body))
        .attach_printable(format!("{description} answered {status}"))
        .attach_printable(body))
}

pub fn classify(status: StatusCode, body: &str) -> CatalogError {
    match status {
        StatusCode::UNAUTHORIZED => CatalogError::Auth,
        StatusCode::TOO_MANY_REQUESTS => CatalogError::RateLimited,
        StatusCode::FORBIDDEN if has_rate_limit_reason(body) => CatalogError::RateLimited,
        _ => CatalogError::Transport,
    }
}

fn has_rate_limit_reason(body: &str) -> bool {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| {
            parsed
                .error
                .errors
                .iter()
                .any(|error| RATE_LIMIT_REASONS.contains(&error.reason.as_str()))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_is_an_auth_failure() {
        assert_eq!(classify(StatusCode::UNAUTHORIZED, ""), CatalogError::Auth);
    }

    #[test]
    fn too_many_requests_is_rate_limited() {
        assert_eq!(
            classify(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            CatalogError::RateLimited
        );
    }

    #[test]
    fn forbidden_with_rate_limit_reason_is_rate_limited() {
        let body = r#"{"error":{"code":403,"errors":[{"reason":"userRateLimitExceeded"}]}}"#;
        assert_eq!(classify(StatusCode::FORBIDDEN, body), CatalogError::RateLimited);
    }

    #[test]
    fn forbidden_quota_is_a_transport_failure() {
        let body = r#"{"error":{"code":403,"errors":[{"reason":"quotaExceeded"}]}}"#;
        assert_eq!(classify(StatusCode::FORBIDDEN, body), CatalogError::Transport);
        assert_eq!(
            classify(StatusCode::FORBIDDEN, "not json"),
            CatalogError::Transport
        );
    }

    #[test]
    fn server_errors_are_transport_failures() {
        assert_eq!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, ""),
            CatalogError::Transport
        );
    }
}

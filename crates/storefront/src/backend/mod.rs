//! Clients for the hosted backend (database, object storage, auth).
//!
//! # Architecture
//!
//! - The backend is the source of truth; nothing is synced locally
//! - Catalog reads are cached in memory via `moka` (5 minute TTL)
//! - Reads keyed by a user are never cached
//!
//! # APIs
//!
//! ## REST (`/rest/v1`)
//! - Table reads and writes, filtered with `column=op.value` query pairs
//! - Remote procedure calls under `/rest/v1/rpc/{function}`
//!
//! ## Storage (`/storage/v1`)
//! - Public object URLs for product images
//! - Existence probes (HEAD) for gallery discovery
//!
//! ## Auth (`/auth/v1`)
//! - Email/password sign up and sign in
//! - OAuth with PKCE, token refresh, sign out
//!
//! Every request carries the project `apikey` header and a bearer token:
//! the visitor's access token when signed in, otherwise the anon key.
//!
//! # Example
//!
//! ```rust,ignore
//! use nalan_storefront::backend::RestClient;
//!
//! let rest = RestClient::new(http.clone(), &config.backend);
//! let catalog = rest.list_jewellery().await?;
//! let ids = rest.cart_ids(&user_id, Some(access_token)).await?;
//! ```

pub mod auth;
pub mod rest;
pub mod storage;
pub mod types;

pub use auth::AuthClient;
pub use rest::RestClient;
pub use storage::StorageClient;

use reqwest::{RequestBuilder, Response, StatusCode};
use thiserror::Error;

/// Longest slice of a response body copied into logs and error messages.
const BODY_PREVIEW_CHARS: usize = 300;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A row was found but its contents have the wrong shape.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl BackendError {
    /// HTTP status reported by the backend, if it answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited(_) => Some(429),
            _ => None,
        }
    }
}

/// Attach the project key and bearer token.
pub(crate) fn authorize(
    request: RequestBuilder,
    anon_key: &str,
    access_token: Option<&str>,
) -> RequestBuilder {
    request
        .header("apikey", anon_key)
        .bearer_auth(access_token.unwrap_or(anon_key))
}

/// Read a response body, mapping 429 and non-success statuses to errors.
pub(crate) async fn read_body(response: Response) -> Result<String, BackendError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(BackendError::RateLimited(retry_after));
    }

    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %preview(&body),
            "Backend returned non-success status"
        );
        return Err(BackendError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    Ok(body)
}

/// Decode a JSON body, logging a preview when it does not fit `T`.
pub(crate) fn parse_body<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %preview(body),
            "Failed to parse backend response"
        );
        BackendError::Parse(e)
    })
}

/// Pull the human-readable message out of an error body.
///
/// The REST layer reports `message`, the auth service `msg` or
/// `error_description`. Anything else falls back to the raw text.
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|value| {
            ["msg", "message", "error_description", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        })
        .map_or_else(|| preview(body), str::to_string)
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Json, Router, http::header, routing::get};
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::test_support;

    async fn status_stub() -> Url {
        let router = Router::new()
            .route(
                "/limited",
                get(|| async {
                    (
                        axum::http::StatusCode::TOO_MANY_REQUESTS,
                        [(header::RETRY_AFTER, "42")],
                        "slow down",
                    )
                }),
            )
            .route(
                "/limited-no-header",
                get(|| async { axum::http::StatusCode::TOO_MANY_REQUESTS }),
            )
            .route(
                "/single-row",
                get(|| async {
                    (
                        axum::http::StatusCode::NOT_ACCEPTABLE,
                        Json(json!({"code": "PGRST116", "message": "JSON object requested"})),
                    )
                }),
            )
            .route(
                "/signup",
                get(|| async {
                    (
                        axum::http::StatusCode::UNPROCESSABLE_ENTITY,
                        Json(json!({"code": 422, "msg": "User already registered"})),
                    )
                }),
            )
            .route(
                "/outage",
                get(|| async { (axum::http::StatusCode::BAD_GATEWAY, "upstream down") }),
            )
            .route("/rows", get(|| async { Json(json!([{"id": 1}])) }));
        test_support::serve(router).await
    }

    async fn fetch(base: &Url, path: &str) -> Result<String, BackendError> {
        let response = reqwest::get(base.join(path).unwrap()).await.unwrap();
        read_body(response).await
    }

    #[tokio::test]
    async fn test_read_body_maps_statuses() {
        let base = status_stub().await;

        assert!(matches!(
            fetch(&base, "/limited").await,
            Err(BackendError::RateLimited(42))
        ));
        assert!(matches!(
            fetch(&base, "/limited-no-header").await,
            Err(BackendError::RateLimited(1))
        ));

        match fetch(&base, "/single-row").await {
            Err(BackendError::Api { status, message }) => {
                assert_eq!(status, 406);
                assert_eq!(message, "JSON object requested");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        match fetch(&base, "/signup").await {
            Err(BackendError::Api { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "User already registered");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        match fetch(&base, "/outage").await {
            Err(err @ BackendError::Api { .. }) => {
                assert_eq!(err.status(), Some(502));
                assert_eq!(err.to_string(), "Backend returned 502: upstream down");
            }
            other => panic!("expected Api error, got {other:?}"),
        }

        let body = fetch(&base, "/rows").await.unwrap();
        let rows: Vec<serde_json::Value> = parse_body(&body).unwrap();
        assert_eq!(rows[0]["id"], 1);
    }

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotFound("jewellery 12".to_string());
        assert_eq!(err.to_string(), "Not found: jewellery 12");

        let err = BackendError::Api {
            status: 400,
            message: "Invalid login credentials".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 400: Invalid login credentials");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = BackendError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn test_error_message_prefers_known_keys() {
        assert_eq!(
            error_message(r#"{"code":"PGRST116","message":"JSON object requested"}"#),
            "JSON object requested"
        );
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Refresh Token Not Found"}"#),
            "Refresh Token Not Found"
        );
        assert_eq!(
            error_message(r#"{"code":422,"msg":"User already registered"}"#),
            "User already registered"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_body() {
        assert_eq!(error_message("upstream timeout"), "upstream timeout");
        let long = "x".repeat(1000);
        assert_eq!(error_message(&long).len(), BODY_PREVIEW_CHARS);
    }
}

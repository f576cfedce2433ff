//! Local stand-ins for the hosted backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{Router, extract::Path, http::StatusCode, routing::get};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use url::Url;

use crate::config::{BackendConfig, StorefrontConfig};
use crate::state::AppState;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{addr}")).unwrap()
}

pub fn backend_config(url: Url) -> BackendConfig {
    BackendConfig {
        url,
        anon_key: SecretString::from("anon"),
        images_bucket: "jewellery-images".to_string(),
        cache_ttl: Duration::from_secs(300),
    }
}

/// App state pointed at a stub backend. The session pool never connects.
pub fn app_state(backend: Url) -> AppState {
    let config = StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/nalan_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from("x".repeat(32)),
        backend: backend_config(backend),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/nalan_test")
        .unwrap();
    AppState::new(config, pool).unwrap()
}

/// Public bucket where product 12 has two gallery images. Products `404`,
/// `429`, and `500` answer every request with that status. `hits` counts requests.
pub async fn storage_stub(hits: Arc<AtomicUsize>) -> Url {
    let router = Router::new().route(
        "/storage/v1/object/public/{bucket}/{*path}",
        get(move |Path((_bucket, path)): Path<(String, String)>| {
            hits.fetch_add(1, Ordering::SeqCst);
            async move {
                match path.as_str() {
                    "med-res/12/1.svg" | "med-res/12/2.svg" => StatusCode::OK,
                    p if p.starts_with("med-res/404/") => StatusCode::NOT_FOUND,
                    p if p.starts_with("med-res/429/") => StatusCode::TOO_MANY_REQUESTS,
                    p if p.starts_with("med-res/500/") => StatusCode::INTERNAL_SERVER_ERROR,
                    // Unknown objects in public buckets answer 400.
                    _ => StatusCode::BAD_REQUEST,
                }
            }
        }),
    );
    serve(router).await
}

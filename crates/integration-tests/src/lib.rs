//! Integration tests for the Nalan Jewel storefront.
//!
//! Every test talks to a running storefront over HTTP and is `#[ignore]`d
//! by default.
//!
//! # Running Tests
//!
//! ```bash
//! # Create the session table, then start the server
//! cargo run -p nalan-cli -- migrate sessions
//! cargo run -p nalan-storefront
//!
//! # Run the ignored tests against it
//! cargo test -p nalan-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_TEST_URL` - Server under test (default: `http://localhost:3000`)
//! - `STOREFRONT_TEST_EMAIL` / `STOREFRONT_TEST_PASSWORD` - A confirmed
//!   backend account; tests that need a signed-in visitor skip without them
//! - `STOREFRONT_TEST_PRODUCT_ID` - An in-stock product id (default: 1)

#![allow(clippy::missing_panics_doc)]

use reqwest::{Client, Response, redirect};

/// Base URL of the storefront under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("STOREFRONT_TEST_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Absolute URL for a storefront path.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url())
}

/// A client that keeps cookies and does not follow redirects, so tests can
/// assert on `Location`.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Credentials for a confirmed test account, if configured.
#[must_use]
pub fn test_credentials() -> Option<(String, String)> {
    let email = std::env::var("STOREFRONT_TEST_EMAIL").ok()?;
    let password = std::env::var("STOREFRONT_TEST_PASSWORD").ok()?;
    Some((email, password))
}

/// Product id used by the cart and wishlist flows.
#[must_use]
pub fn test_product_id() -> String {
    std::env::var("STOREFRONT_TEST_PRODUCT_ID").unwrap_or_else(|_| "1".to_string())
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Sign in with the test account on `client`.
///
/// Returns `false` when no credentials are configured.
pub async fn sign_in(client: &Client) -> bool {
    let Some((email, password)) = test_credentials() else {
        return false;
    };

    let resp = client
        .post(url("/auth/signin"))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to submit sign-in form");

    assert!(
        resp.status().is_redirection(),
        "Sign in did not redirect: {}",
        resp.status()
    );
    assert_eq!(location(&resp), "/");
    true
}

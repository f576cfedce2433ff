//! Auth API client (`/auth/v1`).
//!
//! # OAuth Flow
//!
//! 1. Generate a [`Pkce`] pair and keep the verifier in the session
//! 2. Redirect the visitor to `authorize_url()` with the challenge
//! 3. The provider signs the visitor in and the backend redirects back with `?code=`
//! 4. Exchange code and verifier with `exchange_code_for_session()`
//!
//! # Example
//!
//! ```rust,ignore
//! use nalan_storefront::backend::auth::{AuthClient, OAuthProvider, Pkce};
//!
//! let pkce = Pkce::generate();
//! let url = auth.authorize_url(OAuthProvider::Facebook, &callback, &pkce.challenge)?;
//! // ... later, in the callback handler
//! let session = auth.exchange_code_for_session(&code, &pkce.verifier).await?;
//! ```

mod types;

pub use types::*;

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::instrument;
use url::Url;

use crate::backend::{BackendError, authorize, parse_body, read_body};
use crate::config::BackendConfig;

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Client for the auth API.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    base: Url,
    anon_key: String,
}

impl AuthClient {
    #[must_use]
    pub fn new(client: reqwest::Client, config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(AuthClientInner {
                client,
                base: config.url.clone(),
                anon_key: config.anon_key.expose_secret().to_string(),
            }),
        }
    }

    /// `/auth/v1/{path}` with optional query pairs.
    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, BackendError> {
        let mut url = self.inner.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                BackendError::InvalidData("backend URL cannot be a base".to_string())
            })?;
            segments.pop_if_empty().extend(["auth", "v1", path]);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn post_token<B: Serialize + ?Sized>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<AuthSession, BackendError> {
        let url = self.endpoint("token", &[("grant_type", grant_type)])?;
        let request = authorize(self.inner.client.post(url), &self.inner.anon_key, None).json(body);
        let body = read_body(request.send().await?).await?;
        let token: TokenResponse = parse_body(&body)?;
        Ok(token.into())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Email and Password
    // ─────────────────────────────────────────────────────────────────────────

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Api` with the backend's message when the email is
    /// taken or the password is rejected.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, BackendError> {
        let url = self.endpoint("signup", &[])?;
        let request = authorize(self.inner.client.post(url), &self.inner.anon_key, None)
            .json(&Credentials { email, password });
        let body = read_body(request.send().await?).await?;

        Ok(match parse_body::<SignUpResponse>(&body)? {
            SignUpResponse::Session(token) => SignUpOutcome::SignedIn(token.into()),
            SignUpResponse::User(user) => SignUpOutcome::ConfirmationRequired(user),
        })
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Api` (400) for wrong credentials or an
    /// unconfirmed email.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, BackendError> {
        self.post_token("password", &Credentials { email, password })
            .await
    }

    /// Trade a refresh token for a new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token was revoked or already used.
    #[instrument(skip_all)]
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        self.post_token(
            "refresh_token",
            &serde_json::json!({ "refresh_token": refresh_token }),
        )
        .await
    }

    /// Revoke the session's refresh tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let url = self.endpoint("logout", &[])?;
        let request = authorize(
            self.inner.client.post(url),
            &self.inner.anon_key,
            Some(access_token),
        );
        read_body(request.send().await?).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // OAuth
    // ─────────────────────────────────────────────────────────────────────────

    /// URL that starts a provider sign-in.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend URL cannot carry a path.
    pub fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<Url, BackendError> {
        self.endpoint(
            "authorize",
            &[
                ("provider", provider.as_str()),
                ("redirect_to", redirect_to),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "s256"),
            ],
        )
    }

    /// Exchange an authorization code and the matching verifier for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is unknown, expired, or the verifier does
    /// not match the challenge.
    #[instrument(skip_all)]
    pub async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, BackendError> {
        self.post_token(
            "pkce",
            &serde_json::json!({ "auth_code": auth_code, "code_verifier": code_verifier }),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;

    fn auth() -> AuthClient {
        let config = BackendConfig {
            url: Url::parse("https://abcd.supabase.co").unwrap(),
            anon_key: SecretString::from("anon"),
            images_bucket: "jewellery-images".to_string(),
            cache_ttl: Duration::from_secs(300),
        };
        AuthClient::new(reqwest::Client::new(), &config)
    }

    #[test]
    fn test_token_endpoint() {
        let url = auth()
            .endpoint("token", &[("grant_type", "password")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abcd.supabase.co/auth/v1/token?grant_type=password"
        );
    }

    #[test]
    fn test_authorize_url() {
        let url = auth()
            .authorize_url(
                OAuthProvider::Facebook,
                "http://localhost:3000/auth/callback",
                "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM",
            )
            .unwrap();
        assert_eq!(url.path(), "/auth/v1/authorize");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("provider".to_string(), "facebook".to_string())));
        assert!(pairs.contains(&(
            "redirect_to".to_string(),
            "http://localhost:3000/auth/callback".to_string()
        )));
        assert!(pairs.contains(&("code_challenge_method".to_string(), "s256".to_string())));
    }
}

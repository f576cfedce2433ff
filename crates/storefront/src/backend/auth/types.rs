//! Token and user types for the auth API.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use nalan_core::UserId;

// ─────────────────────────────────────────────────────────────────────────────
// Session Types
// ─────────────────────────────────────────────────────────────────────────────

/// A signed-in visitor's tokens, stored in the server session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer token for user-scoped backend calls.
    pub access_token: String,
    /// Token used to obtain a new access token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Unix timestamp when the token was obtained.
    pub obtained_at: i64,
    pub user_id: UserId,
    pub email: Option<String>,
}

impl AuthSession {
    /// Check if the access token is expired (with 60s buffer).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        let expires_at = self.obtained_at + self.expires_in;
        Utc::now().timestamp() >= expires_at - 60
    }
}

impl From<TokenResponse> for AuthSession {
    fn from(token: TokenResponse) -> Self {
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            obtained_at: Utc::now().timestamp(),
            user_id: UserId::new(token.user.id),
            email: token.user.email,
        }
    }
}

/// A user record as returned by the auth API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Raw token response from the auth API.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[allow(dead_code)]
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: AuthUser,
}

/// What sign up returns: a session when the project auto-confirms emails,
/// otherwise only the new user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

/// Result of a sign up.
#[derive(Debug)]
pub enum SignUpOutcome {
    /// Signed in straight away.
    SignedIn(AuthSession),
    /// Account created; the email address must be confirmed first.
    ConfirmationRequired(AuthUser),
}

// ─────────────────────────────────────────────────────────────────────────────
// OAuth
// ─────────────────────────────────────────────────────────────────────────────

/// Social sign-in providers enabled for the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Facebook,
}

impl OAuthProvider {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
        }
    }
}

impl std::str::FromStr for OAuthProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "facebook" => Ok(Self::Facebook),
            other => Err(format!("unsupported OAuth provider: {other}")),
        }
    }
}

/// PKCE verifier and its S256 challenge.
///
/// The verifier stays in the session; only the challenge leaves the server.
#[derive(Debug, Clone)]
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

impl Pkce {
    /// Generate a fresh verifier from 32 random bytes.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        let verifier = URL_SAFE_NO_PAD.encode(bytes);
        let challenge = challenge_for(&verifier);
        Self {
            verifier,
            challenge,
        }
    }
}

/// `BASE64URL(SHA256(verifier))` without padding.
#[must_use]
pub fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_matches_rfc7636_vector() {
        assert_eq!(
            challenge_for("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_pkce_generate() {
        let pkce = Pkce::generate();
        assert_eq!(pkce.verifier.len(), 43);
        assert_eq!(pkce.challenge, challenge_for(&pkce.verifier));
        assert_ne!(pkce.verifier, Pkce::generate().verifier);
    }

    #[test]
    fn test_session_expiry_buffer() {
        let now = Utc::now().timestamp();
        let mut session = AuthSession {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: 3600,
            obtained_at: now,
            user_id: UserId::new(Uuid::nil()),
            email: None,
        };
        assert!(!session.is_expired());

        session.obtained_at = now - 3600 + 30;
        assert!(session.is_expired());
    }

    #[test]
    fn test_sign_up_response_shapes() {
        let user: SignUpResponse = serde_json::from_str(
            r#"{"id":"7b0f2c36-3d4e-4f60-9d7e-0a1b2c3d4e5f","email":"meera@example.org","confirmation_sent_at":"2024-02-15T10:00:00Z"}"#,
        )
        .unwrap();
        assert!(matches!(user, SignUpResponse::User(_)));

        let session: SignUpResponse = serde_json::from_str(
            r#"{"access_token":"at","token_type":"bearer","expires_in":3600,"refresh_token":"rt",
                "user":{"id":"7b0f2c36-3d4e-4f60-9d7e-0a1b2c3d4e5f","email":"meera@example.org"}}"#,
        )
        .unwrap();
        assert!(matches!(session, SignUpResponse::Session(_)));
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("facebook".parse::<OAuthProvider>(), Ok(OAuthProvider::Facebook));
        assert!("myspace".parse::<OAuthProvider>().is_err());
    }
}

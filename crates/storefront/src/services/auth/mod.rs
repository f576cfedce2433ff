//! Authentication service.
//!
//! Validates form input locally, then hands the actual credential check to
//! the backend auth API. Backend error messages are folded into [`AuthError`]
//! so handlers can show something sensible on the form.

mod error;

pub use error::AuthError;

use url::Url;

use nalan_core::Email;

use crate::backend::BackendError;
use crate::backend::auth::{AuthClient, AuthSession, OAuthProvider, Pkce, SignUpOutcome};

/// Minimum password length accepted by the backend.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
pub struct AuthService<'a> {
    auth: &'a AuthClient,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(auth: &'a AuthClient) -> Self {
        Self { auth }
    }

    // =========================================================================
    // Email and Password
    // =========================================================================

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` or `PasswordMismatch` for bad passwords.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        self.auth
            .sign_up(email.as_str(), password)
            .await
            .map_err(classify)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        self.auth
            .sign_in_with_password(email.as_str(), password)
            .await
            .map_err(classify)
    }

    /// Obtain a fresh session from the stored refresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionExpired` if the backend rejects the token.
    pub async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, AuthError> {
        self.auth
            .refresh_session(&session.refresh_token)
            .await
            .map_err(|e| match e {
                BackendError::Api { status, .. } if (400..500).contains(&status) => {
                    AuthError::SessionExpired
                }
                other => AuthError::Backend(other),
            })
    }

    /// Revoke the session on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails. An already-expired
    /// token counts as signed out.
    pub async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError> {
        match self.auth.sign_out(&session.access_token).await {
            Ok(()) | Err(BackendError::Api { status: 401 | 403, .. }) => Ok(()),
            Err(e) => Err(AuthError::Backend(e)),
        }
    }

    // =========================================================================
    // OAuth
    // =========================================================================

    /// Start a provider sign-in. The returned verifier must be kept in the
    /// session until the callback.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UnsupportedProvider` for unknown providers.
    pub fn start_oauth(&self, provider: &str, redirect_to: &str) -> Result<(Url, Pkce), AuthError> {
        let provider: OAuthProvider = provider
            .parse()
            .map_err(|_| AuthError::UnsupportedProvider(provider.to_string()))?;
        let pkce = Pkce::generate();
        let url = self
            .auth
            .authorize_url(provider, redirect_to, &pkce.challenge)?;
        Ok((url, pkce))
    }

    /// Finish a provider sign-in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidSessionState` when the code is rejected.
    pub async fn finish_oauth(
        &self,
        code: &str,
        verifier: &str,
    ) -> Result<AuthSession, AuthError> {
        self.auth
            .exchange_code_for_session(code, verifier)
            .await
            .map_err(|e| match e {
                BackendError::Api { status, .. } if (400..500).contains(&status) => {
                    AuthError::InvalidSessionState
                }
                other => AuthError::Backend(other),
            })
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Map a backend auth failure onto the error the form should show.
fn classify(error: BackendError) -> AuthError {
    let BackendError::Api { status, message } = &error else {
        return AuthError::Backend(error);
    };
    let lower = message.to_lowercase();

    if lower.contains("invalid login credentials") {
        AuthError::InvalidCredentials
    } else if lower.contains("email not confirmed") {
        AuthError::EmailNotConfirmed
    } else if lower.contains("already registered") || lower.contains("already exists") {
        AuthError::UserAlreadyExists
    } else if lower.contains("password") && *status == 422 {
        AuthError::WeakPassword(message.clone())
    } else if *status == 400 {
        AuthError::InvalidCredentials
    } else {
        AuthError::Backend(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, message: &str) -> BackendError {
        BackendError::Api {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("ಅಆಇಈಉಊ").is_ok());
    }

    #[test]
    fn test_classify_backend_messages() {
        assert!(matches!(
            classify(api(400, "Invalid login credentials")),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            classify(api(400, "Email not confirmed")),
            AuthError::EmailNotConfirmed
        ));
        assert!(matches!(
            classify(api(422, "User already registered")),
            AuthError::UserAlreadyExists
        ));
        assert!(matches!(
            classify(api(422, "Password should be at least 6 characters.")),
            AuthError::WeakPassword(_)
        ));
        assert!(matches!(
            classify(api(500, "database unavailable")),
            AuthError::Backend(_)
        ));
        assert!(matches!(
            classify(BackendError::RateLimited(5)),
            AuthError::Backend(_)
        ));
    }

    #[test]
    fn test_user_messages_hide_backend_detail() {
        let err = AuthError::Backend(api(500, "relation \"auth.users\" does not exist"));
        assert!(!err.user_message().contains("relation"));
        assert_eq!(
            AuthError::InvalidCredentials.user_message(),
            "Invalid email or password"
        );
    }
}

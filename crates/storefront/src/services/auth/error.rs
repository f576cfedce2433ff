//! Authentication error types.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] nalan_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Account exists but the email address was never confirmed.
    #[error("email not confirmed")]
    EmailNotConfirmed,

    /// OAuth provider name not recognised.
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Session state missing or invalid.
    #[error("invalid session state")]
    InvalidSessionState,

    /// Refresh token rejected; the visitor must sign in again.
    #[error("session expired")]
    SessionExpired,

    /// Backend error.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

impl AuthError {
    /// Message safe to show on the sign-in and sign-up forms.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(e) => format!("Invalid email: {e}"),
            Self::WeakPassword(reason) => reason.clone(),
            Self::PasswordMismatch => "Passwords do not match".to_string(),
            Self::InvalidCredentials => "Invalid email or password".to_string(),
            Self::UserAlreadyExists => "An account with this email already exists".to_string(),
            Self::EmailNotConfirmed => {
                "Please confirm your email address before signing in".to_string()
            }
            Self::UnsupportedProvider(_) => "That sign-in method is not available".to_string(),
            Self::InvalidSessionState | Self::SessionExpired => {
                "Your session has expired. Please sign in again".to_string()
            }
            Self::Backend(_) => "Something went wrong. Please try again later".to_string(),
        }
    }
}

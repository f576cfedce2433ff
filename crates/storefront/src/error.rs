//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Failures end on the error page: the response is a redirect to
//! `/error?code=<status>&message=<text>`. Only `Unauthorized` differs, sending
//! the visitor to the sign-in page instead.

use axum::{
    extract::rejection::{FormRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::backend::BackendError;
use crate::services::auth::AuthError;

/// Path of the sign-in page.
pub const SIGNIN_PATH: &str = "/auth/signin";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed. `context` is what the visitor is told.
    #[error("{context}: {source}")]
    Backend {
        context: &'static str,
        #[source]
        source: BackendError,
    },

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Attach a visitor-facing message to a backend failure.
pub trait BackendContext<T> {
    /// # Errors
    ///
    /// Wraps the backend error in `AppError::Backend`.
    fn context(self, context: &'static str) -> Result<T>;
}

impl<T> BackendContext<T> for std::result::Result<T, BackendError> {
    fn context(self, context: &'static str) -> Result<T> {
        self.map_err(|source| match source {
            BackendError::RateLimited(retry_after) => {
                tracing::warn!(retry_after, context, "Backend rate limited");
                AppError::RateLimited
            }
            source => AppError::Backend { context, source },
        })
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Malformed query string");
        Self::BadRequest("Invalid link".to_string())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Malformed form submission");
        Self::BadRequest("Invalid form submission".to_string())
    }
}

impl AppError {
    /// Status code reported on the error page.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Backend { source, .. } => match source {
                BackendError::NotFound(_) => StatusCode::NOT_FOUND,
                other => other
                    .status()
                    .and_then(|code| StatusCode::from_u16(code).ok())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials
                | AuthError::InvalidSessionState
                | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidEmail(_)
                | AuthError::WeakPassword(_)
                | AuthError::PasswordMismatch
                | AuthError::EmailNotConfirmed
                | AuthError::UnsupportedProvider(_) => StatusCode::BAD_REQUEST,
                AuthError::Backend(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Message shown on the error page. Internal details never leak.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend { context, .. } => (*context).to_string(),
            Self::Auth(err) => err.user_message(),
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::NotFound(what) | Self::BadRequest(what) | Self::Unauthorized(what) => {
                what.clone()
            }
            Self::RateLimited => "Too many requests, please slow down".to_string(),
        }
    }

    const fn is_server_error(&self) -> bool {
        match self {
            Self::Backend { source, .. } => !matches!(source, BackendError::NotFound(_)),
            Self::Auth(AuthError::Backend(_)) | Self::Session(_) | Self::Internal(_) => true,
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        if matches!(self, Self::Unauthorized(_)) {
            return Redirect::to(SIGNIN_PATH).into_response();
        }

        Redirect::to(&error_page_url(self.status().as_u16(), &self.user_message())).into_response()
    }
}

/// `/error?code=..&message=..`
#[must_use]
pub fn error_page_url(code: u16, message: &str) -> String {
    format!("/error?code={code}&message={}", urlencoding::encode(message))
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on sign-out to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for visitor actions (cart and wishlist edits).
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

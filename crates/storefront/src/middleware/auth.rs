//! Authentication extractors.
//!
//! The signed-in visitor's tokens live in the session under
//! `session_keys::AUTH`. [`RequireAuth`] guards the cart, wishlist, and order
//! pages; it refreshes an expired access token before the handler runs.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::backend::auth::AuthSession;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, session_keys};
use crate::services::AuthService;
use crate::state::AppState;

/// Extractor that requires a signed-in visitor.
///
/// Rejects with `AppError::Unauthorized`, which redirects to the sign-in
/// page. A refresh the backend refuses also signs the visitor out.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Orders for {}", user.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

fn sign_in_required() -> AppError {
    AppError::Unauthorized("Please sign in to continue".to_string())
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let auth: AuthSession = session
            .get(session_keys::AUTH)
            .await
            .ok()
            .flatten()
            .ok_or_else(sign_in_required)?;

        if !auth.is_expired() {
            return Ok(Self(CurrentUser::from(&auth)));
        }

        match AuthService::new(state.auth()).refresh(&auth).await {
            Ok(fresh) => {
                tracing::debug!(user_id = %fresh.user_id, "Access token refreshed");
                session.insert(session_keys::AUTH, &fresh).await?;
                Ok(Self(CurrentUser::from(&fresh)))
            }
            Err(e) => {
                tracing::warn!(error = %e, user_id = %auth.user_id, "Session refresh failed");
                if let Err(e) = session.flush().await {
                    tracing::error!(error = %e, "Failed to flush expired session");
                }
                clear_sentry_user();
                Err(sign_in_required())
            }
        }
    }
}

/// Store a new sign-in in the session.
///
/// The session id is cycled first so a pre-sign-in id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_auth_session(
    session: &Session,
    auth: &AuthSession,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::AUTH, auth).await?;
    set_sentry_user(&auth.user_id, auth.email.as_deref());
    Ok(())
}

/// Remove the sign-in and everything tied to it (sign-out).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_auth_session(session: &Session) -> Result<Option<AuthSession>, tower_sessions::session::Error> {
    let auth = session.remove::<AuthSession>(session_keys::AUTH).await?;
    session
        .remove::<serde_json::Value>(session_keys::CART_PREFS)
        .await?;
    clear_sentry_user();
    Ok(auth)
}

//! Authentication route handlers.
//!
//! Handles email sign-in and sign-up, sign-out, and provider sign-in through
//! the backend's OAuth endpoints with PKCE. Failed form submissions re-render
//! the form with a message instead of redirecting.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::auth::{AuthSession, SignUpOutcome};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{apply_remember_me, clear_auth_session, set_auth_session, set_flash};
use crate::models::{Flash, session_keys};
use crate::routes::extract::{AppForm, AppQuery};
use crate::routes::page::PageContext;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

const WELCOME_BACK: &str = "Welcome Back!";
const LOGGED_OUT: &str = "Successfully Logged Out!";

// =============================================================================
// Form Types
// =============================================================================

/// Sign-in form data.
#[derive(Debug, Deserialize)]
pub struct SigninForm {
    pub email: String,
    pub password: String,
    /// Checkbox; present only when ticked.
    pub remember_me: Option<String>,
}

/// Sign-up form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

fn ticked(checkbox: Option<&str>) -> bool {
    matches!(checkbox, Some("on" | "true" | "1"))
}

// =============================================================================
// Query Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct OAuthStartQuery {
    pub remember_me: Option<String>,
}

/// Parameters the backend appends when redirecting back from a provider.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signin.html")]
pub struct SigninTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub email: String,
    pub remember_me: bool,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    /// Shown once the account exists but still needs email confirmation.
    pub notice: Option<String>,
    pub email: String,
}

fn form_status(error: &AuthError) -> StatusCode {
    match error {
        AuthError::Backend(_) => StatusCode::BAD_GATEWAY,
        AuthError::UserAlreadyExists => StatusCode::CONFLICT,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Store the session, set the flash, and go home.
async fn complete_sign_in(session: &Session, auth: &AuthSession, remember_me: bool) -> Result<Redirect> {
    set_auth_session(session, auth).await?;
    apply_remember_me(session, remember_me);
    set_flash(session, Flash::success(WELCOME_BACK)).await;
    tracing::info!(user_id = %auth.user_id, remember_me, "Signed in");
    Ok(Redirect::to("/"))
}

// =============================================================================
// Email Sign-in
// =============================================================================

/// Display the sign-in page.
pub async fn signin_page(page: PageContext) -> SigninTemplate {
    SigninTemplate {
        page,
        error: None,
        email: String::new(),
        remember_me: false,
    }
}

/// Handle sign-in form submission.
#[instrument(skip_all)]
pub async fn signin(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    AppForm(form): AppForm<SigninForm>,
) -> Result<Response> {
    let remember_me = ticked(form.remember_me.as_deref());

    match AuthService::new(state.auth())
        .sign_in(&form.email, &form.password)
        .await
    {
        Ok(auth) => Ok(complete_sign_in(&session, &auth, remember_me)
            .await?
            .into_response()),
        Err(e) => {
            tracing::warn!(error = %e, "Sign in failed");
            Ok((
                form_status(&e),
                SigninTemplate {
                    page,
                    error: Some(e.user_message()),
                    email: form.email,
                    remember_me,
                },
            )
                .into_response())
        }
    }
}

// =============================================================================
// Email Sign-up
// =============================================================================

/// Display the sign-up page.
pub async fn signup_page(page: PageContext) -> SignupTemplate {
    SignupTemplate {
        page,
        error: None,
        notice: None,
        email: String::new(),
    }
}

/// Handle sign-up form submission.
///
/// Projects that auto-confirm emails sign the visitor in straight away;
/// otherwise the page asks them to confirm their address.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    AppForm(form): AppForm<SignupForm>,
) -> Result<Response> {
    match AuthService::new(state.auth())
        .sign_up(&form.email, &form.password, &form.confirm_password)
        .await
    {
        Ok(SignUpOutcome::SignedIn(auth)) => Ok(complete_sign_in(&session, &auth, false)
            .await?
            .into_response()),
        Ok(SignUpOutcome::ConfirmationRequired(user)) => {
            tracing::info!(user_id = %user.id, "Sign up awaiting email confirmation");
            Ok(SignupTemplate {
                page,
                error: None,
                notice: Some(format!(
                    "Account created. Check {} for a confirmation link.",
                    user.email.as_deref().unwrap_or(&form.email)
                )),
                email: String::new(),
            }
            .into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sign up failed");
            Ok((
                form_status(&e),
                SignupTemplate {
                    page,
                    error: Some(e.user_message()),
                    notice: None,
                    email: form.email,
                },
            )
                .into_response())
        }
    }
}

// =============================================================================
// Sign-out
// =============================================================================

/// Sign out and return home.
///
/// The local session is cleared even if the backend revocation fails.
#[instrument(skip_all)]
pub async fn signout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    if let Some(auth) = clear_auth_session(&session).await? {
        if let Err(e) = AuthService::new(state.auth()).sign_out(&auth).await {
            tracing::warn!(error = %e, user_id = %auth.user_id, "Backend sign out failed");
        }
        tracing::info!(user_id = %auth.user_id, "Signed out");
    }
    session.cycle_id().await?;
    set_flash(&session, Flash::success(LOGGED_OUT)).await;
    Ok(Redirect::to("/"))
}

// =============================================================================
// OAuth
// =============================================================================

/// Redirect to the provider via the backend's authorize endpoint.
#[instrument(skip(state, session))]
pub async fn oauth_start(
    State(state): State<AppState>,
    session: Session,
    Path(provider): Path<String>,
    AppQuery(query): AppQuery<OAuthStartQuery>,
) -> Result<Redirect> {
    let (url, pkce) = AuthService::new(state.auth())
        .start_oauth(&provider, &state.config().oauth_callback_url())?;

    session
        .insert(session_keys::OAUTH_VERIFIER, &pkce.verifier)
        .await?;
    session
        .insert(
            session_keys::OAUTH_REMEMBER,
            ticked(query.remember_me.as_deref()),
        )
        .await?;

    Ok(Redirect::to(url.as_str()))
}

/// Finish a provider sign-in.
#[instrument(skip_all)]
pub async fn oauth_callback(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    AppQuery(query): AppQuery<CallbackQuery>,
) -> Result<Response> {
    let verifier: Option<String> = session.remove(session_keys::OAUTH_VERIFIER).await?;
    let remember_me: bool = session
        .remove(session_keys::OAUTH_REMEMBER)
        .await?
        .unwrap_or(false);

    if let Some(error) = query.error {
        tracing::warn!(
            error = %error,
            description = query.error_description.as_deref().unwrap_or(""),
            "Provider sign in refused"
        );
        return Ok((
            StatusCode::UNAUTHORIZED,
            SigninTemplate {
                page,
                error: Some(
                    query
                        .error_description
                        .unwrap_or_else(|| "Sign in was cancelled".to_string()),
                ),
                email: String::new(),
                remember_me,
            },
        )
            .into_response());
    }

    let (Some(code), Some(verifier)) = (query.code, verifier) else {
        return Err(AppError::Auth(AuthError::InvalidSessionState));
    };

    let auth = AuthService::new(state.auth())
        .finish_oauth(&code, &verifier)
        .await?;
    Ok(complete_sign_in(&session, &auth, remember_me)
        .await?
        .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ticked() {
        assert!(ticked(Some("on")));
        assert!(ticked(Some("true")));
        assert!(!ticked(Some("off")));
        assert!(!ticked(None));
    }

    #[test]
    fn test_form_status() {
        assert_eq!(
            form_status(&AuthError::InvalidCredentials),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            form_status(&AuthError::UserAlreadyExists),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_signin_template_keeps_email_and_error() {
        let html = SigninTemplate {
            page: PageContext::default(),
            error: Some("Invalid email or password".to_string()),
            email: "meera@example.org".to_string(),
            remember_me: true,
        }
        .render()
        .unwrap();

        assert!(html.contains("Welcome Back"));
        assert!(html.contains("Invalid email or password"));
        assert!(html.contains("value=\"meera@example.org\""));
        assert!(html.contains("Continue with Facebook"));
        assert!(html.contains("checked"));
    }

    #[test]
    fn test_signup_template_notice() {
        let html = SignupTemplate {
            page: PageContext::default(),
            error: None,
            notice: Some("Account created. Check meera@example.org for a confirmation link.".to_string()),
            email: String::new(),
        }
        .render()
        .unwrap();
        assert!(html.contains("Create Account"));
        assert!(html.contains("confirmation link"));
    }
}

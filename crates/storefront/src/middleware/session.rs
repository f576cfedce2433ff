//! Session layer and session helpers.
//!
//! Sessions are stored in `PostgreSQL` through `tower-sessions`. The cookie
//! ends with the browser session unless the visitor ticked "Remember me",
//! which switches the session to a 30-day inactivity expiry.

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;
use crate::models::{CartPrefs, Flash, session_keys};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "nalan_session";

/// Inactivity window for remembered sessions (30 days).
const REMEMBER_ME_DAYS: i64 = 30;

/// Create the session layer with `PostgreSQL` store.
///
/// The `tower_sessions` table is created by `nalan-cli migrate sessions`.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    let store = PostgresStore::new(pool.clone());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnSessionEnd)
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Expiry for a sign-in with or without "Remember me".
#[must_use]
pub const fn expiry_for(remember_me: bool) -> Expiry {
    if remember_me {
        Expiry::OnInactivity(Duration::days(REMEMBER_ME_DAYS))
    } else {
        Expiry::OnSessionEnd
    }
}

/// Apply the remember-me choice to the current session.
pub fn apply_remember_me(session: &Session, remember_me: bool) {
    session.set_expiry(Some(expiry_for(remember_me)));
}

// =============================================================================
// Flash Notices
// =============================================================================

/// Queue a notice for the next rendered page.
pub async fn set_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(session_keys::FLASH, flash).await {
        tracing::warn!(error = %e, "Failed to store flash notice");
    }
}

/// The pending notice, left in place until a page renders it.
pub async fn peek_flash(session: &Session) -> Option<Flash> {
    session
        .get::<Flash>(session_keys::FLASH)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read flash notice");
            None
        })
}

/// Drop the pending notice.
pub async fn clear_flash(session: &Session) {
    if let Err(e) = session.remove::<Flash>(session_keys::FLASH).await {
        tracing::warn!(error = %e, "Failed to clear flash notice");
    }
}

/// Whether the response is a rendered page rather than a redirect or asset.
fn renders_page(response: &Response) -> bool {
    !response.status().is_redirection()
        && response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/html"))
}

/// Consume the flash notice once a page has shown it.
///
/// Pages only peek at the notice, so a handler that bails out to the error
/// page after reading it leaves the notice for the next page.
pub async fn flash_middleware(session: Session, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if renders_page(&response) {
        clear_flash(&session).await;
    }
    response
}

// =============================================================================
// Cart Preferences
// =============================================================================

/// The visitor's per-line cart edits.
pub async fn cart_prefs(session: &Session) -> CartPrefs {
    session
        .get::<CartPrefs>(session_keys::CART_PREFS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart_prefs(
    session: &Session,
    prefs: &CartPrefs,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART_PREFS, prefs).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        middleware::from_fn,
        response::{Html, IntoResponse, Redirect},
        routing::get,
    };
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::routes::PageContext;

    fn flash_router() -> Router {
        Router::new()
            .route(
                "/cart/add",
                get(|session: Session| async move {
                    set_flash(&session, Flash::success("Added to Cart")).await;
                    Redirect::to("/cart")
                }),
            )
            .route(
                "/cart",
                get(|page: PageContext| async move {
                    Html(page.flash.map_or_else(|| "none".to_string(), |f| f.message))
                }),
            )
            .route(
                "/cart-broken",
                get(|_page: PageContext| async {
                    Redirect::to("/error?code=500&message=Error%20Fetching%20Your%20Cart%20Items")
                }),
            )
            .layer(from_fn(flash_middleware))
            .layer(SessionManagerLayer::new(MemoryStore::default()))
    }

    async fn get_page(router: &Router, path: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::get(path);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_flash_survives_redirect_and_renders_once() {
        let router = flash_router();

        let response = get_page(&router, "/cart/add", None).await;
        let cookie = response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let broken = get_page(&router, "/cart-broken", Some(&cookie)).await;
        assert_eq!(broken.status(), StatusCode::SEE_OTHER);

        let shown = get_page(&router, "/cart", Some(&cookie)).await;
        assert_eq!(body(shown).await, "Added to Cart");

        let again = get_page(&router, "/cart", Some(&cookie)).await;
        assert_eq!(body(again).await, "none");
    }

    #[test]
    fn test_only_html_pages_consume_flash() {
        assert!(renders_page(&Html("<p>cart</p>").into_response()));
        assert!(!renders_page(&Redirect::to("/cart").into_response()));
        assert!(!renders_page(&"body { color: red }".into_response()));
        assert!(renders_page(
            &(StatusCode::UNPROCESSABLE_ENTITY, Html("<p>form</p>")).into_response()
        ));
    }

    #[test]
    fn test_remember_me_expiry() {
        assert!(matches!(
            expiry_for(true),
            Expiry::OnInactivity(d) if d == Duration::days(30)
        ));
        assert!(matches!(expiry_for(false), Expiry::OnSessionEnd));
    }
}

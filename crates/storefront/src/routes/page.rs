//! Per-request data shared by every full page.
//!
//! The base layout needs the signed-in visitor, the pending flash notice,
//! the CSP nonce for inline scripts, and the category menu. Handlers take a
//! [`PageContext`] and hand it to their template as `page`.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use nalan_core::navigation::{self, MenuCategory};

use crate::backend::auth::AuthSession;
use crate::middleware::{CspNonce, RequestId, peek_flash};
use crate::models::{CurrentUser, Flash, session_keys};

/// Layout data for `base.html`.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub nonce: String,
    /// Text shown in the navbar search box.
    pub search: String,
    pub request_id: String,
}

impl PageContext {
    /// Keep the search box filled on the product list.
    #[must_use]
    pub fn with_search(mut self, query: &str) -> Self {
        query.trim().clone_into(&mut self.search);
        self
    }

    #[must_use]
    pub const fn signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Email shown next to the account icon.
    #[must_use]
    pub fn account_label(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|user| user.email.as_deref())
            .unwrap_or("Account")
    }

    #[must_use]
    pub const fn menu(&self) -> &'static [MenuCategory] {
        navigation::menu()
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let nonce = parts
            .extensions
            .get::<CspNonce>()
            .map(|nonce| nonce.value().to_string())
            .unwrap_or_default();
        let request_id = parts
            .extensions
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_default();

        let (user, flash) = match parts.extensions.get::<Session>() {
            Some(session) => {
                let user = session
                    .get::<AuthSession>(session_keys::AUTH)
                    .await
                    .ok()
                    .flatten()
                    .map(|auth| CurrentUser::from(&auth));
                (user, peek_flash(session).await)
            }
            None => (None, None),
        };

        Ok(Self {
            user,
            flash,
            nonce,
            search: String::new(),
            request_id,
        })
    }
}

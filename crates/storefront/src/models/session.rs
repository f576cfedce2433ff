//! Session-related types.
//!
//! Types stored in the session for authentication state, one-shot notices,
//! and the visitor-local parts of the cart.

use serde::{Deserialize, Serialize};

use nalan_core::{JewelleryId, UserId};

use crate::backend::auth::AuthSession;

/// The signed-in visitor, as handed to route handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Option<String>,
    /// Bearer token for user-scoped backend calls.
    pub access_token: String,
}

impl From<&AuthSession> for CurrentUser {
    fn from(session: &AuthSession) -> Self {
        Self {
            id: session.user_id,
            email: session.email.clone(),
            access_token: session.access_token.clone(),
        }
    }
}

impl CurrentUser {
    /// Token for backend calls.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        Some(self.access_token.as_str())
    }
}

/// Flash notice tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// A notice shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// CSS class of the toast.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "flash flash-success",
            FlashKind::Error => "flash flash-error",
        }
    }
}

/// Visitor's edits to a cart line. Only the id list is stored remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePrefs {
    pub id: JewelleryId,
    pub quantity: i32,
    #[serde(default)]
    pub modifications: String,
}

/// Per-line cart edits kept in the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartPrefs {
    lines: Vec<LinePrefs>,
}

impl CartPrefs {
    #[must_use]
    pub fn get(&self, id: JewelleryId) -> Option<&LinePrefs> {
        self.lines.iter().find(|line| line.id == id)
    }

    pub fn set_quantity(&mut self, id: JewelleryId, quantity: i32) {
        match self.lines.iter_mut().find(|line| line.id == id) {
            Some(line) => line.quantity = quantity,
            None => self.lines.push(LinePrefs {
                id,
                quantity,
                modifications: String::new(),
            }),
        }
    }

    /// Store the note, keeping quantity 1 for a line not edited before.
    pub fn set_modifications(&mut self, id: JewelleryId, modifications: &str) {
        let modifications = modifications.trim().to_string();
        match self.lines.iter_mut().find(|line| line.id == id) {
            Some(line) => line.modifications = modifications,
            None => self.lines.push(LinePrefs {
                id,
                quantity: 1,
                modifications,
            }),
        }
    }

    pub fn remove(&mut self, id: JewelleryId) {
        self.lines.retain(|line| line.id != id);
    }
}

/// Session keys.
pub mod keys {
    /// Key for the signed-in visitor's tokens (`AuthSession`).
    pub const AUTH: &str = "auth";

    /// Key for the one-shot notice.
    pub const FLASH: &str = "flash";

    /// Key for per-line cart edits.
    pub const CART_PREFS: &str = "cart_prefs";

    /// Key for the PKCE verifier between OAuth redirect and callback.
    pub const OAUTH_VERIFIER: &str = "oauth_verifier";

    /// Key for the remember-me choice made before an OAuth redirect.
    pub const OAUTH_REMEMBER: &str = "oauth_remember";
}

//! Session-backed models for the storefront.
//!
//! Catalog and order data never live here; they come from the backend on
//! every request (or from the catalog cache).

pub mod session;

pub use session::{CartPrefs, CurrentUser, Flash, FlashKind, LinePrefs, keys as session_keys};

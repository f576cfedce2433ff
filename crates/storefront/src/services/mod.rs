//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Email/password and OAuth sign-in against the backend auth API
//! - `cart` - Cart lines built from the stored id list plus session edits
//! - `wishlist` - Wishlist entries joined with catalog rows
//! - `gallery` - Product gallery discovery in object storage

pub mod auth;
pub mod cart;
pub mod gallery;
pub mod wishlist;

pub use auth::{AuthError, AuthService};
pub use cart::CartService;
pub use gallery::GalleryImage;
pub use wishlist::{WishlistEntry, WishlistService};

//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page (hero carousel, new arrivals)
//! GET  /health                  - Liveness check (see main.rs)
//! GET  /health/ready            - Readiness check (see main.rs)
//!
//! # Catalog
//! GET  /products-list           - Product list with facet filters and search
//! GET  /product?product_id=     - Product detail
//!
//! # Cart (requires auth)
//! GET  /cart                    - Cart page (?confirm_remove= opens the delete dialog)
//! POST /cart/add                - Add a product
//! POST /cart/quantity           - Set a line's quantity
//! POST /cart/modifications      - Save a line's modification notes
//! POST /cart/remove             - Remove a product
//!
//! # Wishlist (requires auth)
//! GET  /wishlist                - Wishlist page
//! POST /wishlist/add            - Add a product
//! POST /wishlist/remove         - Remove a product
//! POST /wishlist/move-to-cart   - Move a product into the cart
//!
//! # Orders (requires auth)
//! GET  /my-orders               - Order history
//!
//! # Errors
//! GET  /error?code=&message=    - Error page
//!
//! # Auth
//! GET  /auth/signin             - Sign-in page
//! POST /auth/signin             - Sign-in action (rate limited)
//! GET  /auth/signup             - Sign-up page
//! POST /auth/signup             - Sign-up action (rate limited)
//! POST /auth/signout            - Sign-out action
//! GET  /auth/oauth/{provider}   - Start provider sign-in (rate limited)
//! GET  /auth/callback           - Provider sign-in callback
//! ```

pub mod auth;
pub mod cart;
pub mod errors;
pub mod extract;
pub mod home;
pub mod orders;
pub mod page;
pub mod product;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

pub use page::PageContext;

/// Create the auth routes router.
///
/// Credential submissions and OAuth starts share one per-IP rate limiter.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/signin", post(auth::signin))
        .route("/signup", post(auth::signup))
        .route("/oauth/{provider}", get(auth::oauth_start))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/signin", get(auth::signin_page))
        .route("/signup", get(auth::signup_page))
        .route("/signout", post(auth::signout))
        .route("/callback", get(auth::oauth_callback))
        .merge(limited)
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/quantity", post(cart::quantity))
        .route("/modifications", post(cart::modifications))
        .route("/remove", post(cart::remove))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/remove", post(wishlist::remove))
        .route("/move-to-cart", post(wishlist::move_to_cart))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        // Catalog
        .route("/products-list", get(products::index))
        .route("/product", get(product::show))
        // Visitor lists
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .route("/my-orders", get(orders::index))
        // Errors
        .route("/error", get(errors::show))
        // Auth
        .nest("/auth", auth_routes())
        .fallback(errors::not_found)
}

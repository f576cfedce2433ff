//! Wishlist route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::Redirect};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{BackendContext, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAuth, set_flash};
use crate::models::Flash;
use crate::routes::cart::ProductForm;
use crate::routes::extract::AppForm;
use crate::routes::page::PageContext;
use crate::services::{WishlistEntry, WishlistService};
use crate::state::AppState;

const WISHLIST_PATH: &str = "/wishlist";

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistTemplate {
    pub page: PageContext,
    pub entries: Vec<WishlistEntry>,
}

/// Display the wishlist.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<WishlistTemplate> {
    let entries = WishlistService::new(state.rest(), state.storage())
        .entries(&user)
        .await
        .context("Error Fetching Your Wishlist")?;

    Ok(WishlistTemplate { page, entries })
}

#[instrument(skip_all, fields(user_id = %user.id, product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    AppForm(form): AppForm<ProductForm>,
) -> Result<Redirect> {
    WishlistService::new(state.rest(), state.storage())
        .add(&user, form.product_id)
        .await
        .context("Error Adding Item to Wishlist")?;

    add_breadcrumb(
        "wishlist",
        "Added to wishlist",
        &[("product_id", &form.product_id.to_string())],
    );
    set_flash(&session, Flash::success("Added to Wishlist")).await;
    Ok(Redirect::to(WISHLIST_PATH))
}

#[instrument(skip_all, fields(user_id = %user.id, product_id = %form.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppForm(form): AppForm<ProductForm>,
) -> Result<Redirect> {
    WishlistService::new(state.rest(), state.storage())
        .remove(&user, form.product_id)
        .await
        .context("Error Deleting Item from Wishlist")?;

    add_breadcrumb(
        "wishlist",
        "Removed from wishlist",
        &[("product_id", &form.product_id.to_string())],
    );
    Ok(Redirect::to(WISHLIST_PATH))
}

/// Move an entry into the cart and show the cart.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %form.product_id))]
pub async fn move_to_cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    AppForm(form): AppForm<ProductForm>,
) -> Result<Redirect> {
    WishlistService::new(state.rest(), state.storage())
        .move_to_cart(&user, form.product_id)
        .await
        .context("Error Moving Item to Cart")?;

    set_flash(&session, Flash::success("Moved to Cart")).await;
    Ok(Redirect::to("/cart"))
}

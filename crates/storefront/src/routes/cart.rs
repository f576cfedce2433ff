//! Cart route handlers.
//!
//! The backend cart holds product ids only. Quantity and modification notes
//! are kept in the visitor's session and laid over the lines on each render.
//! Every mutation answers with a redirect back to `/cart`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use nalan_core::JewelleryId;
use nalan_core::cart::{CartLine, cart_total};
use nalan_core::format_dollars;

use crate::error::{BackendContext, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAuth, cart_prefs, save_cart_prefs, set_flash};
use crate::models::Flash;
use crate::routes::extract::{AppForm, AppQuery};
use crate::routes::page::PageContext;
use crate::services::CartService;
use crate::state::AppState;

const CART_PATH: &str = "/cart";

// =============================================================================
// Form Types
// =============================================================================

/// A form naming one product.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub product_id: JewelleryId,
}

/// Quantity stepper submission.
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub product_id: JewelleryId,
    pub quantity: i32,
}

/// Modification notes submission.
#[derive(Debug, Deserialize)]
pub struct ModificationsForm {
    pub product_id: JewelleryId,
    #[serde(default)]
    pub modifications: String,
}

#[derive(Debug, Deserialize)]
pub struct CartQuery {
    /// Unparseable ids leave the dialog closed.
    pub confirm_remove: Option<String>,
}

impl CartQuery {
    fn confirm_remove(&self) -> Option<JewelleryId> {
        self.confirm_remove.as_deref()?.trim().parse().ok()
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub page: PageContext,
    pub lines: Vec<CartLine>,
    pub total: String,
    /// Line awaiting delete confirmation.
    pub confirm: Option<CartLine>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
    session: Session,
    AppQuery(query): AppQuery<CartQuery>,
) -> Result<CartTemplate> {
    let prefs = cart_prefs(&session).await;
    let lines = CartService::new(state.rest(), state.storage())
        .lines(&user, &prefs)
        .await
        .context("Error Fetching Your Cart Items")?;

    let confirm = query
        .confirm_remove()
        .and_then(|id| lines.iter().find(|line| line.id == id).cloned());

    Ok(CartTemplate {
        page,
        total: format_dollars(cart_total(&lines)),
        lines,
        confirm,
    })
}

/// Add a product to the cart.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    AppForm(form): AppForm<ProductForm>,
) -> Result<Redirect> {
    CartService::new(state.rest(), state.storage())
        .add(&user, form.product_id)
        .await
        .context("Error Adding Item to Cart")?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[("product_id", &form.product_id.to_string())],
    );
    set_flash(&session, Flash::success("Added to Cart")).await;
    Ok(Redirect::to(CART_PATH))
}

/// Change a line's quantity. Clamping against stock happens on render.
#[instrument(skip_all, fields(product_id = %form.product_id))]
pub async fn quantity(
    RequireAuth(_user): RequireAuth,
    session: Session,
    AppForm(form): AppForm<QuantityForm>,
) -> Result<Redirect> {
    let mut prefs = cart_prefs(&session).await;
    prefs.set_quantity(form.product_id, form.quantity.max(1));
    save_cart_prefs(&session, &prefs).await?;
    Ok(Redirect::to(CART_PATH))
}

/// Save a line's modification notes.
#[instrument(skip_all, fields(product_id = %form.product_id))]
pub async fn modifications(
    RequireAuth(_user): RequireAuth,
    session: Session,
    AppForm(form): AppForm<ModificationsForm>,
) -> Result<Redirect> {
    let mut prefs = cart_prefs(&session).await;
    prefs.set_modifications(form.product_id, &form.modifications);
    save_cart_prefs(&session, &prefs).await?;
    Ok(Redirect::to(CART_PATH))
}

/// Remove a product from the cart.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %form.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    AppForm(form): AppForm<ProductForm>,
) -> Result<Redirect> {
    CartService::new(state.rest(), state.storage())
        .remove(&user, form.product_id)
        .await
        .context("Error Deleting Item from Cart")?;

    let mut prefs = cart_prefs(&session).await;
    prefs.remove(form.product_id);
    save_cart_prefs(&session, &prefs).await?;

    add_breadcrumb(
        "cart",
        "Removed from cart",
        &[("product_id", &form.product_id.to_string())],
    );
    Ok(Redirect::to(CART_PATH))
}

//! Cart service.
//!
//! The backend cart is an ordered list of product ids. Lines are rebuilt from
//! the catalog on every read, then the visitor's session edits (quantity,
//! modifications) are laid over them and clamped against stock.

use tracing::instrument;

use nalan_core::JewelleryId;
use nalan_core::cart::{self, CartLine};

use crate::backend::{BackendError, RestClient, StorageClient};
use crate::models::{CartPrefs, CurrentUser};

/// Cart operations for one signed-in visitor.
pub struct CartService<'a> {
    rest: &'a RestClient,
    storage: &'a StorageClient,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(rest: &'a RestClient, storage: &'a StorageClient) -> Self {
        Self { rest, storage }
    }

    /// Cart lines in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart or its products cannot be read.
    #[instrument(skip(self, user, prefs), fields(user_id = %user.id))]
    pub async fn lines(
        &self,
        user: &CurrentUser,
        prefs: &CartPrefs,
    ) -> Result<Vec<CartLine>, BackendError> {
        let ids = self.rest.cart_ids(&user.id, user.token()).await?;
        let items = self.rest.jewellery_by_ids(&ids).await?;

        Ok(items
            .into_iter()
            .map(|item| {
                let cover = self.storage.cover_url(&item.id.to_string());
                let mut line =
                    CartLine::new(item.id, item.name, item.price, item.num_in_stock, cover);
                if let Some(edit) = prefs.get(line.id) {
                    line.set_quantity(edit.quantity);
                    line.modifications.clone_from(&edit.modifications);
                }
                line
            })
            .collect())
    }

    /// Add a product. Already-present products are left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be read or written.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn add(&self, user: &CurrentUser, id: JewelleryId) -> Result<(), BackendError> {
        let ids = self.rest.cart_ids(&user.id, user.token()).await?;
        let next = cart::with(&ids, id);
        if next.len() == ids.len() {
            return Ok(());
        }
        self.rest.set_cart_ids(&user.id, &next, user.token()).await
    }

    /// Remove every occurrence of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be read or written.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn remove(&self, user: &CurrentUser, id: JewelleryId) -> Result<(), BackendError> {
        let ids = self.rest.cart_ids(&user.id, user.token()).await?;
        let next = cart::without(&ids, id);
        self.rest.set_cart_ids(&user.id, &next, user.token()).await
    }
}

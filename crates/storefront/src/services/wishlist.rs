//! Wishlist service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::instrument;

use nalan_core::{JewelleryId, format_dollars};

use crate::backend::{BackendError, RestClient, StorageClient};
use crate::models::CurrentUser;
use crate::services::CartService;

/// A wishlist entry joined with its catalog row.
#[derive(Debug, Clone)]
pub struct WishlistEntry {
    pub id: JewelleryId,
    pub name: String,
    pub price: Decimal,
    pub num_in_stock: i32,
    pub added_at: Option<DateTime<Utc>>,
    pub cover_image: String,
}

impl WishlistEntry {
    #[must_use]
    pub fn formatted_price(&self) -> String {
        format_dollars(self.price)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.num_in_stock > 0
    }

    /// "Added on" date, en-US short form.
    #[must_use]
    pub fn added_on(&self) -> Option<String> {
        self.added_at
            .map(|at| at.date_naive().format("%-m/%-d/%Y").to_string())
    }
}

pub struct WishlistService<'a> {
    rest: &'a RestClient,
    storage: &'a StorageClient,
}

impl<'a> WishlistService<'a> {
    #[must_use]
    pub const fn new(rest: &'a RestClient, storage: &'a StorageClient) -> Self {
        Self { rest, storage }
    }

    /// Entries, newest first. Products missing from the catalog are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the wishlist or its products cannot be read.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn entries(&self, user: &CurrentUser) -> Result<Vec<WishlistEntry>, BackendError> {
        let rows = self.rest.wishlist(&user.id, user.token()).await?;
        let ids: Vec<JewelleryId> = rows.iter().map(|row| JewelleryId::new(row.jewel_id)).collect();
        let items = self.rest.jewellery_by_ids(&ids).await?;

        Ok(items
            .into_iter()
            .map(|item| {
                let added_at = rows
                    .iter()
                    .find(|row| row.jewel_id == item.id.as_i64())
                    .and_then(|row| row.created_at);
                WishlistEntry {
                    cover_image: self.storage.cover_url(&item.id.to_string()),
                    id: item.id,
                    name: item.name,
                    price: item.price,
                    num_in_stock: item.num_in_stock,
                    added_at,
                }
            })
            .collect())
    }

    /// # Errors
    ///
    /// Returns an error if the RPC fails.
    pub async fn add(&self, user: &CurrentUser, id: JewelleryId) -> Result<(), BackendError> {
        self.rest.append_to_wishlist(&user.id, id, user.token()).await
    }

    /// # Errors
    ///
    /// Returns an error if the RPC fails.
    pub async fn remove(&self, user: &CurrentUser, id: JewelleryId) -> Result<(), BackendError> {
        self.rest.remove_from_wishlist(&user.id, id, user.token()).await
    }

    /// Put the product in the cart, then drop it from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if either step fails. A failed wishlist removal leaves
    /// the product in both lists.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn move_to_cart(&self, user: &CurrentUser, id: JewelleryId) -> Result<(), BackendError> {
        CartService::new(self.rest, self.storage).add(user, id).await?;
        self.remove(user, id).await
    }
}

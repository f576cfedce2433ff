//! REST client for backend tables and remote procedures.
//!
//! Uses `reqwest` 0.13 against the `/rest/v1` endpoint. Catalog reads are
//! cached using `moka`; the TTL comes from configuration (5 minutes by default).

mod cache;
mod conversions;

use std::collections::HashMap;
use std::sync::Arc;

use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use nalan_core::catalog::Jewellery;
use nalan_core::orders::OrderItem;
use nalan_core::pricing::{MetalRate, PriceRow, Rates};
use nalan_core::{JewelleryId, UserId};

use crate::backend::types::{
    CartRow, JewelleryRow, PriceBreakdownRow, UserOrdersRow, WishlistArgs, WishlistRow, rpc,
    tables,
};
use crate::backend::{BackendError, authorize, parse_body, read_body};
use crate::config::BackendConfig;

use cache::{CacheKey, CacheValue};
use conversions::{convert_jewellery, convert_orders, convert_price_rows};

/// A `column=value` query pair, where the value carries its operator (`eq.5`).
pub type QueryPair<'a> = (&'a str, String);

/// `column=eq.value`
#[must_use]
pub fn eq<'a>(column: &'a str, value: impl std::fmt::Display) -> QueryPair<'a> {
    (column, format!("eq.{value}"))
}

/// `column=in.(a,b,c)`
#[must_use]
pub fn in_list<'a, T: std::fmt::Display>(column: &'a str, values: &[T]) -> QueryPair<'a> {
    let joined = values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    (column, format!("in.({joined})"))
}

fn select_columns(columns: &str) -> QueryPair<'static> {
    ("select", columns.to_string())
}

// =============================================================================
// RestClient
// =============================================================================

/// Client for backend tables and RPC.
///
/// Catalog reads (`list_jewellery`, `jewellery_by_id`, `price_rows`,
/// `metal_rates`) are cached; everything keyed by a user goes to the backend
/// every time.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

struct RestClientInner {
    client: reqwest::Client,
    base: Url,
    anon_key: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl RestClient {
    /// Create a new REST client sharing the given HTTP connection pool.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &BackendConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(RestClientInner {
                client,
                base: config.url.clone(),
                anon_key: config.anon_key.expose_secret().to_string(),
                cache,
            }),
        }
    }

    /// `/rest/v1/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.inner.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                BackendError::InvalidData("backend URL cannot be a base".to_string())
            })?;
            path.pop_if_empty().extend(["rest", "v1"]).extend(segments);
        }
        Ok(url)
    }

    fn table_url(&self, table: &str, query: &[QueryPair<'_>]) -> Result<Url, BackendError> {
        let mut url = self.endpoint(&[table])?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    // =========================================================================
    // Generic Operations
    // =========================================================================

    /// Read rows from a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or rows do not decode as `T`.
    #[instrument(skip(self, query, access_token), fields(table = %table))]
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[QueryPair<'_>],
        access_token: Option<&str>,
    ) -> Result<Vec<T>, BackendError> {
        let url = self.table_url(table, query)?;
        let request = authorize(self.inner.client.get(url), &self.inner.anon_key, access_token);
        let body = read_body(request.send().await?).await?;
        parse_body(&body)
    }

    /// Patch rows matching `filters`. Returns how many rows changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, filters, body, access_token), fields(table = %table))]
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        table: &str,
        filters: &[QueryPair<'_>],
        body: &B,
        access_token: Option<&str>,
    ) -> Result<usize, BackendError> {
        let url = self.table_url(table, filters)?;
        let request = authorize(
            self.inner.client.patch(url),
            &self.inner.anon_key,
            access_token,
        )
        .header("Prefer", "return=representation")
        .json(body);
        let body = read_body(request.send().await?).await?;
        let changed: Vec<serde_json::Value> = parse_body(&body)?;
        Ok(changed.len())
    }

    /// Insert a row, merging into an existing row with the same primary key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, body, access_token), fields(table = %table))]
    pub async fn upsert<B: Serialize + ?Sized>(
        &self,
        table: &str,
        body: &B,
        access_token: Option<&str>,
    ) -> Result<(), BackendError> {
        let url = self.table_url(table, &[])?;
        let request = authorize(
            self.inner.client.post(url),
            &self.inner.anon_key,
            access_token,
        )
        .header("Prefer", "resolution=merge-duplicates,return=minimal")
        .json(body);
        read_body(request.send().await?).await?;
        Ok(())
    }

    /// Call a remote procedure. The result body is discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, args, access_token), fields(function = %function))]
    pub async fn rpc<A: Serialize + ?Sized>(
        &self,
        function: &str,
        args: &A,
        access_token: Option<&str>,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&["rpc", function])?;
        let request = authorize(
            self.inner.client.post(url),
            &self.inner.anon_key,
            access_token,
        )
        .json(args);
        read_body(request.send().await?).await?;
        Ok(())
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// The whole jewellery catalog, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_jewellery(&self) -> Result<Arc<Vec<Jewellery>>, BackendError> {
        if let Some(CacheValue::Catalog(items)) = self.inner.cache.get(&CacheKey::Catalog).await {
            debug!("Cache hit for catalog");
            return Ok(items);
        }

        let rows: Vec<JewelleryRow> = self
            .select(
                tables::JEWELLERY,
                &[select_columns("*"), ("order", "id.asc".to_string())],
                None,
            )
            .await?;
        let items = Arc::new(rows.into_iter().map(convert_jewellery).collect::<Vec<_>>());

        self.inner
            .cache
            .insert(CacheKey::Catalog, CacheValue::Catalog(Arc::clone(&items)))
            .await;

        Ok(items)
    }

    /// A single jewellery item.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no row has this id.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn jewellery_by_id(&self, id: JewelleryId) -> Result<Jewellery, BackendError> {
        let cache_key = CacheKey::Jewellery(id);
        if let Some(CacheValue::Jewellery(item)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for jewellery");
            return Ok(*item);
        }

        let rows: Vec<JewelleryRow> = self
            .select(tables::JEWELLERY, &[select_columns("*"), eq("id", id)], None)
            .await?;
        let item = rows
            .into_iter()
            .next()
            .map(convert_jewellery)
            .ok_or_else(|| BackendError::NotFound(format!("Jewellery not found: {id}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Jewellery(Box::new(item.clone())))
            .await;

        Ok(item)
    }

    /// Jewellery rows for the given ids, in the order the ids were given.
    ///
    /// Ids with no row are skipped. Not cached: the id list is user-specific.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn jewellery_by_ids(
        &self,
        ids: &[JewelleryId],
    ) -> Result<Vec<Jewellery>, BackendError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<JewelleryRow> = self
            .select(
                tables::JEWELLERY,
                &[select_columns("*"), in_list("id", ids)],
                None,
            )
            .await?;
        let mut by_id: HashMap<JewelleryId, Jewellery> = rows
            .into_iter()
            .map(convert_jewellery)
            .map(|item| (item.id, item))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Price breakdown rows for a product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the product has no breakdown row and
    /// `InvalidData` when `price_rows.data` is not an array.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn price_rows(&self, id: JewelleryId) -> Result<Arc<Vec<PriceRow>>, BackendError> {
        let cache_key = CacheKey::PriceRows(id);
        if let Some(CacheValue::PriceRows(rows)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for price rows");
            return Ok(rows);
        }

        let rows: Vec<PriceBreakdownRow> = self
            .select(
                tables::PRICE_BREAKDOWN,
                &[select_columns("price_rows"), eq("id", id)],
                None,
            )
            .await?;
        let row = rows.into_iter().next().ok_or_else(|| {
            tracing::warn!(product_id = %id, "No price data found for product");
            BackendError::NotFound("No price data found for product".to_string())
        })?;
        let price_rows = Arc::new(convert_price_rows(row)?);

        self.inner
            .cache
            .insert(cache_key, CacheValue::PriceRows(Arc::clone(&price_rows)))
            .await;

        Ok(price_rows)
    }

    /// Current metal rates keyed by metal name.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn metal_rates(&self) -> Result<Arc<Rates>, BackendError> {
        if let Some(CacheValue::Rates(rates)) = self.inner.cache.get(&CacheKey::Rates).await {
            debug!("Cache hit for metal rates");
            return Ok(rates);
        }

        let rows: Vec<MetalRate> = self
            .select(tables::RATES, &[select_columns("*")], None)
            .await?;
        let rates = Arc::new(rows.into_iter().collect::<Rates>());

        self.inner
            .cache
            .insert(CacheKey::Rates, CacheValue::Rates(Arc::clone(&rates)))
            .await;

        Ok(rates)
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Product ids in the user's cart. No cart row means an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id))]
    pub async fn cart_ids(
        &self,
        user_id: &UserId,
        access_token: Option<&str>,
    ) -> Result<Vec<JewelleryId>, BackendError> {
        let rows: Vec<CartRow> = self
            .select(
                tables::CART,
                &[select_columns("user_id,id_of_jewels"), eq("user_id", user_id)],
                access_token,
            )
            .await?;

        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.id_of_jewels)
            .unwrap_or_default()
            .into_iter()
            .map(JewelleryId::new)
            .collect())
    }

    /// Overwrite the user's cart ids, creating the cart row on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ids, access_token), fields(user_id = %user_id, count = ids.len()))]
    pub async fn set_cart_ids(
        &self,
        user_id: &UserId,
        ids: &[JewelleryId],
        access_token: Option<&str>,
    ) -> Result<(), BackendError> {
        let row = CartRow {
            user_id: *user_id.as_uuid(),
            id_of_jewels: Some(ids.iter().map(JewelleryId::as_i64).collect()),
        };

        let changed = self
            .update(
                tables::CART,
                &[eq("user_id", user_id)],
                &serde_json::json!({ "id_of_jewels": row.id_of_jewels }),
                access_token,
            )
            .await?;

        if changed == 0 {
            debug!("No cart row yet, inserting");
            self.upsert(tables::CART, &row, access_token).await?;
        }

        Ok(())
    }

    // =========================================================================
    // Wishlist Methods
    // =========================================================================

    /// Wishlist entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id))]
    pub async fn wishlist(
        &self,
        user_id: &UserId,
        access_token: Option<&str>,
    ) -> Result<Vec<WishlistRow>, BackendError> {
        self.select(
            tables::WISHLIST,
            &[
                select_columns("jewel_id,created_at"),
                eq("user_id", user_id),
                ("order", "created_at.desc".to_string()),
            ],
            access_token,
        )
        .await
    }

    /// Add a product to the wishlist. Uniqueness is enforced by the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC fails.
    pub async fn append_to_wishlist(
        &self,
        user_id: &UserId,
        jewel_id: JewelleryId,
        access_token: Option<&str>,
    ) -> Result<(), BackendError> {
        let args = WishlistArgs {
            p_user_id: *user_id.as_uuid(),
            p_jewel_id: jewel_id.as_i64(),
        };
        self.rpc(rpc::APPEND_TO_WISHLIST, &args, access_token).await
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC fails.
    pub async fn remove_from_wishlist(
        &self,
        user_id: &UserId,
        jewel_id: JewelleryId,
        access_token: Option<&str>,
    ) -> Result<(), BackendError> {
        let args = WishlistArgs {
            p_user_id: *user_id.as_uuid(),
            p_jewel_id: jewel_id.as_i64(),
        };
        self.rpc(rpc::REMOVE_FROM_WISHLIST, &args, access_token).await
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// The user's order history as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the orders column is not
    /// an array of orders.
    #[instrument(skip(self, access_token), fields(user_id = %user_id))]
    pub async fn orders(
        &self,
        user_id: &UserId,
        access_token: Option<&str>,
    ) -> Result<Vec<OrderItem>, BackendError> {
        let rows: Vec<UserOrdersRow> = self
            .select(
                tables::USER_ORDERS,
                &[select_columns("orders"), eq("user_id", user_id)],
                access_token,
            )
            .await?;

        rows.into_iter()
            .next()
            .map_or_else(|| Ok(Vec::new()), convert_orders)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;

    fn client(base: &str) -> RestClient {
        let config = BackendConfig {
            url: Url::parse(base).unwrap(),
            anon_key: SecretString::from("anon"),
            images_bucket: "jewellery-images".to_string(),
            cache_ttl: Duration::from_secs(300),
        };
        RestClient::new(reqwest::Client::new(), &config)
    }

    #[test]
    fn test_table_url_encodes_table_and_filters() {
        let rest = client("https://abcd.supabase.co");
        let url = rest
            .table_url(tables::JEWELLERY, &[select_columns("*"), eq("id", 7)])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abcd.supabase.co/rest/v1/Jewellery%20Data?select=*&id=eq.7"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let rest = client("http://localhost:54321/project/");
        let url = rest.endpoint(&["rpc", rpc::APPEND_TO_WISHLIST]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:54321/project/rest/v1/rpc/append_to_wishlist"
        );
    }

    #[test]
    fn test_filter_helpers() {
        assert_eq!(eq("user_id", "abc"), ("user_id", "eq.abc".to_string()));
        let ids = [3, 1, 2].map(JewelleryId::new);
        assert_eq!(in_list("id", &ids), ("id", "in.(3,1,2)".to_string()));
    }

    #[tokio::test]
    async fn test_jewellery_by_ids_empty_skips_request() {
        // Unroutable base: any request would fail.
        let rest = client("http://127.0.0.1:9");
        assert!(rest.jewellery_by_ids(&[]).await.unwrap().is_empty());
    }
}

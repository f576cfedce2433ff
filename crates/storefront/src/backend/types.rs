//! Raw row shapes returned by the REST API.
//!
//! These mirror the backend tables column for column. Conversion into
//! `nalan_core` domain types happens in `rest::conversions`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nalan_core::catalog::Attributes;

/// Table names as they exist in the backend schema.
pub mod tables {
    pub const JEWELLERY: &str = "Jewellery Data";
    pub const PRICE_BREAKDOWN: &str = "Price Breakdown";
    pub const RATES: &str = "Rates";
    pub const CART: &str = "Cart";
    pub const WISHLIST: &str = "Wishlist";
    pub const USER_ORDERS: &str = "User Orders";
}

/// Remote procedure names.
pub mod rpc {
    pub const APPEND_TO_WISHLIST: &str = "append_to_wishlist";
    pub const REMOVE_FROM_WISHLIST: &str = "remove_from_wishlist";
}

/// A row of `Jewellery Data`.
#[derive(Debug, Clone, Deserialize)]
pub struct JewelleryRow {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    #[serde(rename = "numInStock", default)]
    pub num_in_stock: Option<i32>,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Option<Attributes>,
}

/// A row of `Price Breakdown`; `price_rows` holds `{ "data": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceBreakdownRow {
    #[serde(default)]
    pub price_rows: serde_json::Value,
}

/// A row of `Cart`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartRow {
    pub user_id: Uuid,
    #[serde(default)]
    pub id_of_jewels: Option<Vec<i64>>,
}

/// A row of `Wishlist`.
#[derive(Debug, Clone, Deserialize)]
pub struct WishlistRow {
    pub jewel_id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A row of `User Orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserOrdersRow {
    #[serde(default)]
    pub orders: Option<serde_json::Value>,
}

/// Arguments of the wishlist RPCs.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistArgs {
    pub p_user_id: Uuid,
    pub p_jewel_id: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_jewellery_row_tolerates_missing_columns() {
        let row: JewelleryRow =
            serde_json::from_str(r#"{"id": 3, "name": "Kundan Haram", "price": 84999.5}"#)
                .unwrap();
        assert_eq!(row.id, 3);
        assert_eq!(row.num_in_stock, None);
        assert!(row.attributes.is_none());
    }

    #[test]
    fn test_wishlist_row_parses_timestamp() {
        let row: WishlistRow = serde_json::from_str(
            r#"{"jewel_id": 9, "created_at": "2024-03-01T08:15:00+00:00"}"#,
        )
        .unwrap();
        assert_eq!(row.jewel_id, 9);
        assert!(row.created_at.is_some());
    }
}

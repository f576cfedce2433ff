//! Conversions from raw REST rows to domain types.

use nalan_core::JewelleryId;
use nalan_core::catalog::Jewellery;
use nalan_core::orders::OrderItem;
use nalan_core::pricing::PriceRow;

use crate::backend::BackendError;
use crate::backend::types::{JewelleryRow, PriceBreakdownRow, UserOrdersRow};

pub fn convert_jewellery(row: JewelleryRow) -> Jewellery {
    let image_id = row
        .image_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| row.id.to_string());

    Jewellery {
        id: JewelleryId::new(row.id),
        name: row.name,
        price: row.price,
        num_in_stock: row.num_in_stock.unwrap_or(0).max(0),
        image_id,
        description: row.description.filter(|d| !d.trim().is_empty()),
        attributes: row.attributes.unwrap_or_default(),
    }
}

/// Unwrap `price_rows.data` into typed rows.
///
/// # Errors
///
/// `InvalidData` when `data` is missing or not an array, `Parse` when an
/// element does not look like a breakdown row.
pub fn convert_price_rows(mut row: PriceBreakdownRow) -> Result<Vec<PriceRow>, BackendError> {
    match row.price_rows.get_mut("data").map(serde_json::Value::take) {
        Some(items @ serde_json::Value::Array(_)) => {
            serde_json::from_value(items).map_err(BackendError::Parse)
        }
        _ => Err(BackendError::InvalidData(
            "Price rows data is not an array".to_string(),
        )),
    }
}

/// Orders stored as a JSON array; a missing or null column means no orders.
pub fn convert_orders(row: UserOrdersRow) -> Result<Vec<OrderItem>, BackendError> {
    match row.orders {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(value @ serde_json::Value::Array(_)) => {
            serde_json::from_value(value).map_err(BackendError::Parse)
        }
        Some(_) => Err(BackendError::InvalidData(
            "Orders column is not an array".to_string(),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn test_convert_jewellery_defaults() {
        let row = JewelleryRow {
            id: 14,
            name: "Peacock Jhumka".to_string(),
            price: Decimal::new(18_750, 0),
            num_in_stock: Some(-2),
            image_id: Some("  ".to_string()),
            description: Some(String::new()),
            attributes: None,
        };
        let item = convert_jewellery(row);
        assert_eq!(item.id, JewelleryId::new(14));
        assert_eq!(item.num_in_stock, 0);
        assert_eq!(item.image_id, "14");
        assert_eq!(item.description, None);
        assert_eq!(item.attributes.metal, None);
    }

    #[test]
    fn test_convert_price_rows_requires_array() {
        let ok = PriceBreakdownRow {
            price_rows: json!({"data": [{"productDetail": "Gold", "value": 100}]}),
        };
        assert_eq!(convert_price_rows(ok).unwrap().len(), 1);

        let not_array = PriceBreakdownRow {
            price_rows: json!({"data": {"productDetail": "Gold"}}),
        };
        assert!(matches!(
            convert_price_rows(not_array),
            Err(BackendError::InvalidData(msg)) if msg == "Price rows data is not an array"
        ));

        let missing = PriceBreakdownRow {
            price_rows: serde_json::Value::Null,
        };
        assert!(matches!(
            convert_price_rows(missing),
            Err(BackendError::InvalidData(_))
        ));
    }

    #[test]
    fn test_convert_orders() {
        let empty = UserOrdersRow { orders: None };
        assert!(convert_orders(empty).unwrap().is_empty());

        let row = UserOrdersRow {
            orders: Some(json!([{
                "id": "ORD001", "productName": "Gold Chain Necklace", "price": 45000,
                "quantity": 1, "status": "Delivered", "orderDate": "2024-02-15",
                "estimatedDelivery": "2024-02-25"
            }])),
        };
        let orders = convert_orders(row).unwrap();
        assert_eq!(orders.len(), 1);

        let bad = UserOrdersRow {
            orders: Some(json!({"id": 1})),
        };
        assert!(matches!(convert_orders(bad), Err(BackendError::InvalidData(_))));
    }
}

//! Order history.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{OrderStatus, format_dollars};

/// One entry in a customer's order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(deserialize_with = "id_text")]
    pub id: String,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub status: OrderStatus,
    pub order_date: String,
    #[serde(default)]
    pub estimated_delivery: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(rename = "imageID", default)]
    pub image_id: Option<String>,
}

fn id_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "order id must be a string or number, got {other}"
        ))),
    }
}

impl OrderItem {
    #[must_use]
    pub fn formatted_price(&self) -> String {
        format_dollars(self.price)
    }

    /// "Ordered on" date.
    #[must_use]
    pub fn ordered_on(&self) -> String {
        format_date(&self.order_date)
    }

    /// Delivery line under the status badge.
    ///
    /// Delivered orders show when they arrived; anything else shows the
    /// estimate. No date, no label.
    #[must_use]
    pub fn delivery_label(&self) -> Option<String> {
        let date = format_date(self.estimated_delivery.as_deref()?);
        Some(match self.status {
            OrderStatus::Delivered => format!("Delivered on: {date}"),
            _ => format!("Estimated Delivery: {date}"),
        })
    }
}

/// Parse either a plain date (`2024-02-15`) or an RFC 3339 timestamp.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// en-US short date (`2/15/2024`). Unparseable input is shown as stored.
#[must_use]
pub fn format_date(raw: &str) -> String {
    parse_date(raw).map_or_else(
        || raw.to_string(),
        |date| date.format("%-m/%-d/%Y").to_string(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(status: OrderStatus, estimated: Option<&str>) -> OrderItem {
        OrderItem {
            id: "ORD001".to_string(),
            product_name: "Gold Chain Necklace".to_string(),
            price: Decimal::new(45_000, 0),
            quantity: 1,
            status,
            order_date: "2024-02-15".to_string(),
            estimated_delivery: estimated.map(str::to_string),
            tracking_number: None,
            image_id: None,
        }
    }

    #[test]
    fn test_format_date_short_us() {
        assert_eq!(format_date("2024-02-05"), "2/5/2024");
        assert_eq!(format_date("2024-12-25T10:30:00Z"), "12/25/2024");
        assert_eq!(format_date("soon"), "soon");
    }

    #[test]
    fn test_delivery_label_by_status() {
        assert_eq!(
            order(OrderStatus::Shipped, Some("2024-02-20")).delivery_label(),
            Some("Estimated Delivery: 2/20/2024".to_string())
        );
        assert_eq!(
            order(OrderStatus::Delivered, Some("2024-02-25")).delivery_label(),
            Some("Delivered on: 2/25/2024".to_string())
        );
        assert_eq!(order(OrderStatus::Processing, None).delivery_label(), None);
    }

    #[test]
    fn test_decode_order_json() {
        let orders: Vec<OrderItem> = serde_json::from_str(
            r#"[{"id": 17, "productName": "Diamond Stud Earrings", "price": 25000,
                 "quantity": 2, "status": "Cancelled", "orderDate": "2024-02-10",
                 "imageID": "studs-01"}]"#,
        )
        .unwrap();
        let first = orders.first().unwrap();
        assert_eq!(first.id, "17");
        assert_eq!(first.formatted_price(), "$25,000");
        assert_eq!(first.image_id.as_deref(), Some("studs-01"));
        assert_eq!(first.ordered_on(), "2/10/2024");
    }
}

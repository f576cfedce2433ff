//! Order status.

use serde::{Deserialize, Serialize};

/// Fulfilment state of an order line, as stored in the backend's order JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// CSS modifier for the status badge on the order history page.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Processing => "badge-processing",
            Self::Shipped => "badge-shipped",
            Self::Delivered => "badge-delivered",
            Self::Cancelled => "badge-cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_decodes_backend_spelling() {
        let status: OrderStatus = serde_json::from_str("\"Shipped\"").unwrap();
        assert_eq!(status, OrderStatus::Shipped);
        assert!(serde_json::from_str::<OrderStatus>("\"shipped\"").is_err());
    }

    #[test]
    fn test_badge_classes_are_distinct() {
        let classes = [
            OrderStatus::Processing.badge_class(),
            OrderStatus::Shipped.badge_class(),
            OrderStatus::Delivered.badge_class(),
            OrderStatus::Cancelled.badge_class(),
        ];
        for (i, a) in classes.iter().enumerate() {
            for b in classes.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}

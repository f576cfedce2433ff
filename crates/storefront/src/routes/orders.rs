//! Order history route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use nalan_core::orders::OrderItem;

use crate::backend::StorageClient;
use crate::error::{BackendContext, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::page::PageContext;
use crate::state::AppState;

/// An order line with its resolved image.
#[derive(Clone)]
pub struct OrderView {
    pub order: OrderItem,
    pub image: Option<String>,
}

impl OrderView {
    fn new(order: OrderItem, storage: &StorageClient) -> Self {
        let image = order
            .image_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| storage.cover_url(id));
        Self { order, image }
    }
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub orders: Vec<OrderView>,
}

/// Display the signed-in visitor's orders.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<OrdersTemplate> {
    let orders = state
        .rest()
        .orders(&user.id, user.token())
        .await
        .context("Error Fetching Your Orders")?;

    Ok(OrdersTemplate {
        page,
        orders: orders
            .into_iter()
            .map(|order| OrderView::new(order, state.storage()))
            .collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nalan_core::OrderStatus;
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_orders_template_shows_status_and_delivery() {
        let html = OrdersTemplate {
            page: PageContext::default(),
            orders: vec![OrderView {
                order: OrderItem {
                    id: "ORD-1042".to_string(),
                    product_name: "Temple Haram".to_string(),
                    price: Decimal::new(48_000, 0),
                    quantity: 1,
                    status: OrderStatus::Delivered,
                    order_date: "2024-02-01".to_string(),
                    estimated_delivery: Some("2024-02-15".to_string()),
                    tracking_number: Some("TRK998".to_string()),
                    image_id: None,
                },
                image: None,
            }],
        }
        .render()
        .unwrap();

        assert!(html.contains("My Orders"));
        assert!(html.contains("Temple Haram"));
        assert!(html.contains("badge-delivered"));
        assert!(html.contains("Delivered on: 2/15/2024"));
        assert!(html.contains("TRK998"));
    }
}

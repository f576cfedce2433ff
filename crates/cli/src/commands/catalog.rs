//! Read-only catalog inspection against the hosted backend.
//!
//! # Environment Variables
//!
//! - `BACKEND_URL` - Project URL of the hosted backend
//! - `BACKEND_ANON_KEY` - Public anon API key

use std::time::Duration;

use nalan_core::catalog::{Facet, OptionCount, option_counts};
use nalan_core::{JewelleryId, format_dollars};
use nalan_storefront::backend::RestClient;
use nalan_storefront::config::BackendConfig;

use super::CommandError;

fn rest_client() -> Result<RestClient, CommandError> {
    let _ = dotenvy::dotenv();
    let config = BackendConfig::from_env()?;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("nalan-cli/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(RestClient::new(http, &config))
}

/// Counts for one facet, or all of them.
fn select_counts(counts: Vec<OptionCount>, facet: Option<Facet>) -> Vec<OptionCount> {
    counts
        .into_iter()
        .filter(|c| facet.is_none_or(|f| c.facet == f))
        .collect()
}

/// Log how many catalog items match each filter option.
///
/// # Errors
///
/// Returns an error if the backend config is missing or the catalog read fails.
pub async fn summary(facet: Option<Facet>) -> Result<(), CommandError> {
    let catalog = rest_client()?.list_jewellery().await?;
    let in_stock = catalog.iter().filter(|item| item.in_stock()).count();
    tracing::info!(items = catalog.len(), in_stock, "Catalog loaded");

    for count in select_counts(option_counts(&catalog), facet) {
        tracing::info!(
            facet = count.facet.key(),
            option = count.option,
            count = count.count,
            "Option"
        );
    }
    Ok(())
}

/// Log one product and its price breakdown.
///
/// # Errors
///
/// Returns an error if the product does not exist or a backend read fails.
pub async fn show(id: JewelleryId) -> Result<(), CommandError> {
    let rest = rest_client()?;
    let (item, rows) = tokio::try_join!(rest.jewellery_by_id(id), rest.price_rows(id))?;

    tracing::info!(
        id = %item.id,
        name = %item.name,
        price = %format_dollars(item.price),
        stock = item.num_in_stock,
        "Product"
    );
    for row in rows.iter() {
        tracing::info!(detail = %row.product_detail, value = %row.value, "Price row");
    }
    Ok(())
}

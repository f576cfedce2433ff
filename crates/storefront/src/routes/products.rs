//! Product list route handler.
//!
//! Filter state lives entirely in the query string: one `facet=option` pair
//! per selection, plus `q` (search text), `open` (expanded sidebar facet) and
//! `sidebar=hidden`. Every link on the page rebuilds the query so the
//! non-filter parameters survive a filter change.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use tracing::instrument;

use nalan_core::catalog::{
    Facet, FilterState, Jewellery, OptionCount, PRODUCTS_PATH, filter_catalog, option_counts,
};
use nalan_core::format_dollars;

use crate::backend::StorageClient;
use crate::error::{BackendContext, Result};
use crate::filters;
use crate::routes::page::PageContext;
use crate::state::AppState;

// =============================================================================
// Query Types
// =============================================================================

/// Non-filter parameters of the product list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub query: String,
    pub open: Option<Facet>,
    pub sidebar_hidden: bool,
}

impl ListParams {
    fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "q" => value.trim().clone_into(&mut params.query),
                "open" => params.open = Facet::from_key(value),
                "sidebar" => params.sidebar_hidden = value == "hidden",
                _ => {}
            }
        }
        params
    }

    /// Product list URL for `filters` with these parameters.
    #[must_use]
    pub fn href(&self, filters: &FilterState) -> String {
        let mut parts: Vec<String> = Vec::new();
        let filter_query = filters.to_query_string();
        if !filter_query.is_empty() {
            parts.push(filter_query);
        }
        if !self.query.is_empty() {
            parts.push(format!("q={}", urlencoding::encode(&self.query)));
        }
        if let Some(open) = self.open {
            parts.push(format!("open={}", open.key()));
        }
        if self.sidebar_hidden {
            parts.push("sidebar=hidden".to_string());
        }

        if parts.is_empty() {
            PRODUCTS_PATH.to_string()
        } else {
            format!("{PRODUCTS_PATH}?{}", parts.join("&"))
        }
    }

    fn with_open(&self, open: Option<Facet>) -> Self {
        Self {
            open,
            ..self.clone()
        }
    }

    fn with_sidebar_hidden(&self, sidebar_hidden: bool) -> Self {
        Self {
            sidebar_hidden,
            ..self.clone()
        }
    }
}

// =============================================================================
// View Types
// =============================================================================

/// One checkbox in a sidebar facet.
#[derive(Clone)]
pub struct OptionView {
    pub label: &'static str,
    pub checked: bool,
    pub count: usize,
    /// List URL with this option toggled.
    pub href: String,
}

/// A collapsible facet in the sidebar.
#[derive(Clone)]
pub struct FacetView {
    pub key: &'static str,
    pub label: String,
    /// Number of selected options, shown as a badge.
    pub selected: usize,
    pub open: bool,
    /// Opens this facet, or closes it when already open.
    pub toggle_href: String,
    pub options: Vec<OptionView>,
}

/// A removable chip in the active-filters bar.
#[derive(Clone)]
pub struct ChipView {
    pub label: &'static str,
    pub remove_href: String,
}

/// A product card.
#[derive(Clone)]
pub struct CardView {
    pub href: String,
    pub name: String,
    pub price: String,
    pub image: String,
    pub image_alt: String,
    pub stock_badge: Option<String>,
}

impl CardView {
    fn new(item: &Jewellery, storage: &StorageClient) -> Self {
        Self {
            href: super::product::product_href(item.id),
            name: item.name.clone(),
            price: format_dollars(item.price),
            image: storage.thumbnail_url(&item.image_id),
            image_alt: item.name.clone(),
            stock_badge: item.stock_badge(),
        }
    }
}

fn facet_views(
    filters: &FilterState,
    params: &ListParams,
    counts: &[OptionCount],
) -> Vec<FacetView> {
    Facet::ALL
        .into_iter()
        .map(|facet| {
            let open = params.open == Some(facet);
            let options = counts
                .iter()
                .filter(|count| count.facet == facet)
                .map(|count| OptionView {
                    label: count.option,
                    checked: filters.is_selected(facet, count.option),
                    count: count.count,
                    href: params.href(&filters.toggled(facet, count.option)),
                })
                .collect();

            FacetView {
                key: facet.key(),
                label: facet.label(),
                selected: filters.count_for(facet),
                open,
                toggle_href: params
                    .with_open(if open { None } else { Some(facet) })
                    .href(filters),
                options,
            }
        })
        .collect()
}

fn chip_views(filters: &FilterState, params: &ListParams) -> Vec<ChipView> {
    filters
        .active()
        .map(|(facet, option)| ChipView {
            label: option,
            remove_href: params.href(&filters.without(facet, option)),
        })
        .collect()
}

// =============================================================================
// Handler
// =============================================================================

/// Product list template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub page: PageContext,
    pub query: String,
    pub facets: Vec<FacetView>,
    pub chips: Vec<ChipView>,
    pub products: Vec<CardView>,
    pub clear_href: String,
    pub sidebar_hidden: bool,
    pub sidebar_toggle_href: String,
}

/// Display the product list.
#[instrument(skip(state, page, pairs))]
pub async fn index(
    State(state): State<AppState>,
    page: PageContext,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<ProductsTemplate> {
    let filters = FilterState::from_query_pairs(pairs.iter().map(|(k, v)| (k, v)));
    let params = ListParams::from_pairs(&pairs);

    let catalog = state
        .rest()
        .list_jewellery()
        .await
        .context("Error Fetching Jewellery Data")?;

    let query = (!params.query.is_empty()).then_some(params.query.as_str());
    let products: Vec<CardView> = filter_catalog(&catalog, &filters, query)
        .into_iter()
        .map(|item| CardView::new(item, state.storage()))
        .collect();

    tracing::debug!(
        filters = filters.active_count(),
        results = products.len(),
        "Product list filtered"
    );

    Ok(ProductsTemplate {
        page: page.with_search(&params.query),
        query: params.query.clone(),
        facets: facet_views(&filters, &params, &option_counts(&catalog)),
        chips: chip_views(&filters, &params),
        products,
        clear_href: params.href(&FilterState::new()),
        sidebar_hidden: params.sidebar_hidden,
        sidebar_toggle_href: params
            .with_sidebar_hidden(!params.sidebar_hidden)
            .href(&filters),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_list_params_parse() {
        let params = ListParams::from_pairs(&pairs(&[
            ("gender", "Women"),
            ("q", " jhumka "),
            ("open", "metal"),
            ("sidebar", "hidden"),
        ]));
        assert_eq!(params.query, "jhumka");
        assert_eq!(params.open, Some(Facet::Metal));
        assert!(params.sidebar_hidden);

        assert_eq!(
            ListParams::from_pairs(&pairs(&[("open", "colour")])).open,
            None
        );
    }

    #[test]
    fn test_href_keeps_search_and_open_facet() {
        let params = ListParams {
            query: "temple set".to_string(),
            open: Some(Facet::Gender),
            sidebar_hidden: false,
        };
        let filters = FilterState::from_selections(&[(Facet::Gender, "Women")]);
        assert_eq!(
            params.href(&filters),
            "/products-list?gender=Women&q=temple%20set&open=gender"
        );
        assert_eq!(
            ListParams::default().href(&FilterState::new()),
            "/products-list"
        );
    }

    #[test]
    fn test_option_toggle_links() {
        let filters = FilterState::from_selections(&[(Facet::Metal, "Gold")]);
        let params = ListParams::default();
        let counts = vec![
            OptionCount {
                facet: Facet::Metal,
                option: "Gold",
                count: 4,
            },
            OptionCount {
                facet: Facet::Metal,
                option: "Platinum",
                count: 1,
            },
        ];

        let facets = facet_views(&filters, &params, &counts);
        let metal = facets.iter().find(|f| f.key == "metal").unwrap();
        assert_eq!(metal.selected, 1);
        assert!(!metal.open);
        assert_eq!(metal.toggle_href, "/products-list?metal=Gold&open=metal");

        let gold = metal.options.iter().find(|o| o.label == "Gold").unwrap();
        assert!(gold.checked);
        assert_eq!(gold.count, 4);
        assert_eq!(gold.href, "/products-list");

        let platinum = metal.options.iter().find(|o| o.label == "Platinum").unwrap();
        assert!(!platinum.checked);
        assert_eq!(platinum.href, "/products-list?metal=Gold&metal=Platinum");
    }

    #[test]
    fn test_chips_remove_one_selection() {
        let filters =
            FilterState::from_selections(&[(Facet::Gender, "Men"), (Facet::Purity, "22")]);
        let chips = chip_views(&filters, &ListParams::default());
        assert_eq!(chips.len(), 2);

        let men = chips.iter().find(|c| c.label == "Men").unwrap();
        assert_eq!(men.remove_href, "/products-list?purity=22");
    }
}

//! Product detail route handler.
//!
//! Gallery, price breakdown, and metal rates are fetched concurrently. If any
//! of them fails the page still renders, showing an error panel with a
//! "Try Again" link instead of the product.
//!
//! Page UI state is carried in the query string:
//!
//! ```text
//! /product?product_id=12&tab=price&image=2&zoom=1&section=metal
//! ```

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use nalan_core::catalog::Jewellery;
use nalan_core::pricing::{self, PriceRow, Rates};
use nalan_core::{JewelleryId, format_dollars};

use crate::error::{AppError, Result};
use crate::filters;
use crate::routes::extract::AppQuery;
use crate::routes::page::PageContext;
use crate::services::GalleryImage;
use crate::services::gallery;
use crate::state::AppState;

/// Detail page URL for a product.
#[must_use]
pub fn product_href(id: JewelleryId) -> String {
    format!("/product?product_id={id}")
}

// =============================================================================
// Query Types
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Details,
    Price,
}

impl Tab {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("price") => Self::Price,
            _ => Self::Details,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Details => "details",
            Self::Price => "price",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub product_id: Option<String>,
    pub tab: Option<String>,
    pub image: Option<String>,
    pub zoom: Option<String>,
    pub section: Option<String>,
}

/// Parsed page state; builds the links that change one piece of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductParams {
    pub id: JewelleryId,
    pub tab: Tab,
    pub image: usize,
    pub zoom: bool,
    pub section: Option<String>,
}

impl ProductParams {
    fn from_query(query: ProductQuery) -> Option<Self> {
        let id = query.product_id?.trim().parse().ok()?;
        Some(Self {
            id,
            tab: Tab::parse(query.tab.as_deref()),
            image: query
                .image
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(0),
            zoom: matches!(query.zoom.as_deref(), Some("1" | "true")),
            section: query.section.filter(|s| !s.is_empty()),
        })
    }

    #[must_use]
    pub fn href(&self) -> String {
        let mut url = product_href(self.id);
        if self.tab != Tab::Details {
            url.push_str("&tab=");
            url.push_str(self.tab.as_str());
        }
        if self.image > 0 {
            url.push_str(&format!("&image={}", self.image));
        }
        if self.zoom {
            url.push_str("&zoom=1");
        }
        if let Some(section) = &self.section {
            url.push_str("&section=");
            url.push_str(&urlencoding::encode(section));
        }
        url
    }

    fn with(&self, change: impl FnOnce(&mut Self)) -> String {
        let mut next = self.clone();
        change(&mut next);
        next.href()
    }
}

// =============================================================================
// View Types
// =============================================================================

/// A thumbnail in the gallery strip.
#[derive(Clone)]
pub struct ThumbView {
    pub image: GalleryImage,
    pub selected: bool,
    pub href: String,
}

/// One row of a detail section.
#[derive(Clone)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

/// An expandable block in the details tab.
#[derive(Clone)]
pub struct DetailSection {
    pub slug: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    pub rows: Vec<DetailRow>,
    /// Free text, used by the description block.
    pub text: Option<String>,
    pub expanded: bool,
    pub toggle_href: String,
}

fn row(label: &'static str, value: Option<&str>) -> Option<DetailRow> {
    value.map(|value| DetailRow {
        label,
        value: value.to_string(),
    })
}

/// Detail blocks for a product. Blocks with nothing to show are left out.
fn detail_sections(item: &Jewellery) -> Vec<DetailSection> {
    let attrs = &item.attributes;
    let karatage = attrs.purity.as_deref().map(|purity| format!("{purity}K"));

    let metal = [
        row("Karatage", karatage.as_deref()),
        row("Material Colour", attrs.metal_colour.as_deref()),
        row("Metal", attrs.metal.as_deref()),
        row("Diamond Clarity", attrs.diamond_clarity.as_deref()),
    ];
    let general = [
        row("Jewellery Name", Some(&item.name)),
        row("Jewellery Type", attrs.jewellery_type.as_deref()),
        row("Product Type", attrs.product.as_deref()),
        row("Brand", attrs.brand.as_deref()),
        row("Collection", attrs.collection.as_deref()),
        row("Gender", attrs.gender.as_deref()),
        row("Occassion", attrs.occassion.as_deref()),
        row("Community", attrs.community.as_deref()),
    ];

    let mut sections = vec![
        section("metal", "Metal Details", "/static/images/icons/metal.svg", metal),
        section("general", "General Details", "/static/images/icons/general.svg", general),
    ];
    sections.retain(|s| !s.rows.is_empty());

    if let Some(text) = item.description.as_deref().filter(|d| !d.trim().is_empty()) {
        sections.push(DetailSection {
            slug: "description",
            title: "Description",
            icon: "/static/images/icons/description.svg",
            rows: Vec::new(),
            text: Some(text.to_string()),
            expanded: false,
            toggle_href: String::new(),
        });
    }
    sections
}

fn section<const N: usize>(
    slug: &'static str,
    title: &'static str,
    icon: &'static str,
    rows: [Option<DetailRow>; N],
) -> DetailSection {
    DetailSection {
        slug,
        title,
        icon,
        rows: rows.into_iter().flatten().collect(),
        text: None,
        expanded: false,
        toggle_href: String::new(),
    }
}

/// One row of the price breakdown table.
#[derive(Clone)]
pub struct PriceRowView {
    pub detail: String,
    pub icon: Option<String>,
    pub subtitle: Option<String>,
    pub rate: String,
    pub weight: String,
    pub discount: String,
    pub value: String,
    pub is_total: bool,
}

impl PriceRowView {
    fn new(row: &PriceRow, rates: &Rates) -> Self {
        Self {
            detail: row.product_detail.clone(),
            icon: row.icon().map(String::from),
            subtitle: row.subtitle().map(String::from),
            rate: pricing::rate_cell(row, rates),
            weight: pricing::weight_cell(row),
            discount: pricing::discount_cell(row),
            value: pricing::value_cell(row),
            is_total: row.is_total(),
        }
    }
}

/// Everything the loaded page shows.
pub struct ProductView {
    pub name: String,
    pub description: String,
    pub total_price: String,
    pub stock_badge: Option<String>,
    pub in_stock: bool,
    pub id: JewelleryId,
    pub tab: Tab,
    pub details_href: String,
    pub price_href: String,
    pub thumbs: Vec<ThumbView>,
    pub selected: Option<GalleryImage>,
    pub zoom: bool,
    pub zoom_href: String,
    pub close_zoom_href: String,
    pub sections: Vec<DetailSection>,
    pub price_rows: Vec<PriceRowView>,
}

impl ProductView {
    fn new(
        params: &ProductParams,
        item: &Jewellery,
        images: Vec<GalleryImage>,
        rows: &[PriceRow],
        rates: &Rates,
    ) -> Self {
        let selected_index = params.image.min(images.len().saturating_sub(1));
        let selected = images.get(selected_index).cloned();
        let thumbs = images
            .into_iter()
            .enumerate()
            .map(|(index, image)| ThumbView {
                image,
                selected: index == selected_index,
                href: params.with(|p| {
                    p.image = index;
                    p.zoom = false;
                }),
            })
            .collect();

        let sections = detail_sections(item)
            .into_iter()
            .map(|mut section| {
                section.expanded = params.section.as_deref() == Some(section.slug);
                let target = (!section.expanded).then(|| section.slug.to_string());
                section.toggle_href = params.with(|p| p.section = target);
                section
            })
            .collect();

        Self {
            name: item.name.clone(),
            description: item.description.clone().unwrap_or_default(),
            total_price: format_dollars(if rows.is_empty() {
                item.price
            } else {
                pricing::total(rows)
            }),
            stock_badge: item.stock_badge(),
            in_stock: item.in_stock(),
            id: item.id,
            tab: params.tab,
            details_href: params.with(|p| p.tab = Tab::Details),
            price_href: params.with(|p| p.tab = Tab::Price),
            zoom: params.zoom && selected.is_some(),
            zoom_href: params.with(|p| {
                p.image = selected_index;
                p.zoom = true;
            }),
            close_zoom_href: params.with(|p| p.zoom = false),
            thumbs,
            selected,
            sections,
            price_rows: rows.iter().map(|row| PriceRowView::new(row, rates)).collect(),
        }
    }

    #[must_use]
    pub fn showing_price(&self) -> bool {
        self.tab == Tab::Price
    }
}

/// What the page renders: the product, or an error panel.
pub enum ProductState {
    Loaded(Box<ProductView>),
    Failed { retry_href: String },
}

impl ProductState {
    #[must_use]
    pub fn loaded(&self) -> Option<&ProductView> {
        match self {
            Self::Loaded(view) => Some(view),
            Self::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn retry_href(&self) -> &str {
        match self {
            Self::Loaded(_) => "",
            Self::Failed { retry_href } => retry_href,
        }
    }
}

// =============================================================================
// Handler
// =============================================================================

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub page: PageContext,
    pub state: ProductState,
}

/// Display a product.
///
/// # Errors
///
/// A missing or malformed `product_id` ends on the 404 error page.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    AppQuery(query): AppQuery<ProductQuery>,
) -> Result<ProductTemplate> {
    let params = ProductParams::from_query(query)
        .ok_or_else(|| AppError::NotFound("Page not found".to_string()))?;

    let loaded = tokio::try_join!(
        state.rest().jewellery_by_id(params.id),
        gallery::probe(state.storage(), params.id),
        state.rest().price_rows(params.id),
        state.rest().metal_rates(),
    );

    let product_state = match loaded {
        Ok((item, images, rows, rates)) => {
            ProductState::Loaded(Box::new(ProductView::new(&params, &item, images, &rows, &rates)))
        }
        Err(e) => {
            tracing::error!(error = %e, product_id = %params.id, "Failed to load product");
            ProductState::Failed {
                retry_href: params.href(),
            }
        }
    };

    Ok(ProductTemplate {
        page,
        state: product_state,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::extract::Query;
    use nalan_core::catalog::Attributes;
    use rust_decimal::Decimal;

    use super::*;

    fn query(product_id: Option<&str>) -> ProductQuery {
        ProductQuery {
            product_id: product_id.map(String::from),
            tab: None,
            image: None,
            zoom: None,
            section: None,
        }
    }

    fn studs() -> Jewellery {
        Jewellery {
            id: JewelleryId::new(12),
            name: "Lakshmi Studs".to_string(),
            price: Decimal::new(1_450, 0),
            num_in_stock: 3,
            image_id: "studs-12".to_string(),
            description: Some("Round 22 karat studs with bead detailing.".to_string()),
            attributes: Attributes {
                purity: Some("22".to_string()),
                metal: Some("Gold".to_string()),
                metal_colour: Some("Yellow Gold".to_string()),
                product: Some("Earrings".to_string()),
                gender: Some("Women".to_string()),
                ..Attributes::default()
            },
        }
    }

    fn image(n: u32) -> GalleryImage {
        GalleryImage {
            number: n,
            thumbnail: format!("/img/{n}.svg"),
            full: format!("/img/{n}.svg"),
            alt: format!("12's {n} image"),
        }
    }

    #[test]
    fn test_missing_or_bad_product_id() {
        assert!(ProductParams::from_query(query(None)).is_none());
        assert!(ProductParams::from_query(query(Some("ring"))).is_none());
        assert_eq!(
            ProductParams::from_query(query(Some("12"))).unwrap().id,
            JewelleryId::new(12)
        );
    }

    #[test]
    fn test_unparseable_image_falls_back_to_first() {
        let uri = "/product?product_id=12&image=abc".parse().unwrap();
        let Query(raw) = Query::<ProductQuery>::try_from_uri(&uri).unwrap();
        let params = ProductParams::from_query(raw).unwrap();
        assert_eq!(params.id, JewelleryId::new(12));
        assert_eq!(params.image, 0);

        let uri = "/product?product_id=12&image=3".parse().unwrap();
        let Query(raw) = Query::<ProductQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(ProductParams::from_query(raw).unwrap().image, 3);
    }

    #[test]
    fn test_params_href() {
        let mut params = ProductParams::from_query(query(Some("12"))).unwrap();
        assert_eq!(params.href(), "/product?product_id=12");

        params.tab = Tab::Price;
        params.image = 2;
        params.zoom = true;
        params.section = Some("metal".to_string());
        assert_eq!(
            params.href(),
            "/product?product_id=12&tab=price&image=2&zoom=1&section=metal"
        );
    }

    #[test]
    fn test_detail_sections() {
        let sections = detail_sections(&studs());
        let slugs: Vec<&str> = sections.iter().map(|s| s.slug).collect();
        assert_eq!(slugs, ["metal", "general", "description"]);

        let metal = &sections[0];
        assert_eq!(metal.rows[0].label, "Karatage");
        assert_eq!(metal.rows[0].value, "22K");
    }

    #[test]
    fn test_view_clamps_selected_image_and_toggles_section() {
        let params = ProductParams {
            id: JewelleryId::new(12),
            tab: Tab::Details,
            image: 7,
            zoom: true,
            section: Some("general".to_string()),
        };
        let view = ProductView::new(
            &params,
            &studs(),
            vec![image(1), image(2)],
            &[],
            &Rates::default(),
        );

        assert_eq!(view.selected.as_ref().unwrap().number, 2);
        assert!(view.thumbs[1].selected);
        assert!(view.zoom);
        assert_eq!(view.total_price, "$1,450");

        let general = view.sections.iter().find(|s| s.slug == "general").unwrap();
        assert!(general.expanded);
        assert_eq!(general.toggle_href, "/product?product_id=12&image=7&zoom=1");

        let metal = view.sections.iter().find(|s| s.slug == "metal").unwrap();
        assert!(!metal.expanded);
        assert!(metal.toggle_href.ends_with("&section=metal"));
    }

    #[test]
    fn test_zoom_needs_an_image() {
        let params = ProductParams {
            id: JewelleryId::new(12),
            tab: Tab::Price,
            image: 0,
            zoom: true,
            section: None,
        };
        let view = ProductView::new(&params, &studs(), Vec::new(), &[], &Rates::default());
        assert!(view.selected.is_none());
        assert!(!view.zoom);
        assert!(view.showing_price());
    }
}

//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use nalan_core::catalog::Jewellery;
use nalan_core::format_dollars;

use crate::filters;
use crate::routes::extract::AppQuery;
use crate::routes::page::PageContext;
use crate::state::AppState;

// =============================================================================
// Hero Configuration (Static content for carousel)
// =============================================================================

/// Position for hero slide CTA button.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonPosition {
    #[default]
    Center,
    BottomLeft,
    BottomCenter,
}

impl ButtonPosition {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Center => "hero-cta-center",
            Self::BottomLeft => "hero-cta-bottom-left",
            Self::BottomCenter => "hero-cta-bottom-center",
        }
    }
}

/// A single slide in the hero carousel.
#[derive(Clone)]
pub struct HeroSlide {
    pub title: Option<&'static str>,
    pub subtitle: Option<&'static str>,
    pub button_text: &'static str,
    pub button_url: &'static str,
    pub image_path: &'static str,
    pub image_alt: &'static str,
    pub button_position: ButtonPosition,
}

/// Hero carousel configuration.
#[derive(Clone)]
pub struct HeroConfig {
    pub slides: Vec<HeroSlide>,
    /// Index of the slide shown first.
    pub current: usize,
    pub autoplay_ms: u32,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            slides: vec![
                HeroSlide {
                    title: Some("Crafted for Every Celebration"),
                    subtitle: Some("Temple gold, polki and everyday diamonds, made in Chennai."),
                    button_text: "Shop All Jewellery",
                    button_url: "/products-list",
                    image_path: "/static/images/hero/fold-1.svg",
                    image_alt: "Gold temple necklace on silk",
                    button_position: ButtonPosition::BottomLeft,
                },
                HeroSlide {
                    title: Some("The Wedding Edit"),
                    subtitle: None,
                    button_text: "Explore Bridal",
                    button_url: "/products-list?occassion=Bridal%20Wear",
                    image_path: "/static/images/hero/fold-2.svg",
                    image_alt: "Bridal jewellery set",
                    button_position: ButtonPosition::Center,
                },
                HeroSlide {
                    title: None,
                    subtitle: None,
                    button_text: "Shop Diamonds",
                    button_url: "/products-list?jewelleryType=Diamond%20Jewellery",
                    image_path: "/static/images/hero/fold-3.svg",
                    image_alt: "Diamond studs and pendant",
                    button_position: ButtonPosition::BottomCenter,
                },
                HeroSlide {
                    title: Some("Everyday Gold"),
                    subtitle: Some("Light pieces for the office, the commute and everything after."),
                    button_text: "Shop Office Wear",
                    button_url: "/products-list?occassion=Office%20Wear",
                    image_path: "/static/images/hero/fold-4.svg",
                    image_alt: "Gold chains and bangles",
                    button_position: ButtonPosition::BottomLeft,
                },
            ],
            current: 0,
            autoplay_ms: 5000,
        }
    }
}

impl HeroConfig {
    /// Show slide `index`, wrapping around in both directions.
    #[must_use]
    pub fn at(mut self, index: i64) -> Self {
        self.current = wrap(index, self.slides.len());
        self
    }

    #[must_use]
    pub fn prev_href(&self) -> String {
        format!("/?slide={}", wrap(as_i64(self.current) - 1, self.slides.len()))
    }

    #[must_use]
    pub fn next_href(&self) -> String {
        format!("/?slide={}", wrap(as_i64(self.current) + 1, self.slides.len()))
    }
}

fn as_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn wrap(index: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    usize::try_from(index.rem_euclid(as_i64(len))).unwrap_or(0)
}

// =============================================================================
// New Arrivals
// =============================================================================

/// Number of products in the new arrivals strip.
const NEW_ARRIVALS: usize = 8;

/// Card in the new arrivals strip.
#[derive(Clone)]
pub struct ArrivalView {
    pub href: String,
    pub name: String,
    pub price: String,
    pub image: String,
}

/// Newest products first; ids grow with insertion.
fn new_arrivals(items: &[Jewellery], thumbnail: impl Fn(&str) -> String) -> Vec<ArrivalView> {
    let mut newest: Vec<&Jewellery> = items.iter().collect();
    newest.sort_by(|a, b| b.id.cmp(&a.id));
    newest
        .into_iter()
        .take(NEW_ARRIVALS)
        .map(|item| ArrivalView {
            href: super::product::product_href(item.id),
            name: item.name.clone(),
            price: format_dollars(item.price),
            image: thumbnail(&item.image_id),
        })
        .collect()
}

// =============================================================================
// Handler
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub hero: HeroConfig,
    pub arrivals: Vec<ArrivalView>,
}

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    pub slide: Option<i64>,
}

/// Display the home page.
///
/// A catalog failure hides the new arrivals strip instead of failing the page.
#[instrument(skip(state, page))]
pub async fn home(
    State(state): State<AppState>,
    page: PageContext,
    AppQuery(query): AppQuery<HomeQuery>,
) -> HomeTemplate {
    let arrivals = match state.rest().list_jewellery().await {
        Ok(items) => new_arrivals(&items, |image_id| state.storage().thumbnail_url(image_id)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch new arrivals");
            Vec::new()
        }
    };

    HomeTemplate {
        page,
        hero: HeroConfig::default().at(query.slide.unwrap_or(0)),
        arrivals,
    }
}

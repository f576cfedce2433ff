//! Jewellery catalog records and faceted filtering.
//!
//! The product list page narrows the catalog with a sidebar of facets. Each
//! facet has a fixed option list; selections are OR-ed within a facet and
//! AND-ed across facets. The selection state travels in the page URL
//! (`?gender=Women&gender=Men&metal=Gold`) so every checkbox is a plain link.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::JewelleryId;

/// Path of the product list page.
pub const PRODUCTS_PATH: &str = "/products-list";

/// Items with fewer than this many units in stock get the "Selling Fast!" badge.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

/// A jewellery item as shown in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Jewellery {
    pub id: JewelleryId,
    pub name: String,
    pub price: Decimal,
    pub num_in_stock: i32,
    pub image_id: String,
    pub description: Option<String>,
    pub attributes: Attributes,
}

impl Jewellery {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.num_in_stock > 0
    }

    /// Low-stock notice shown under the card's price.
    #[must_use]
    pub fn stock_badge(&self) -> Option<String> {
        (self.num_in_stock < LOW_STOCK_THRESHOLD)
            .then(|| format!("Selling Fast! Only {} left in stock", self.num_in_stock))
    }
}

/// Descriptive attributes stored as a JSON object on each catalog row.
///
/// Every field is optional: the backend owns the schema and rows are allowed
/// to omit anything. Numeric values (purity is often stored as `22`) are
/// read as their decimal text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attributes {
    #[serde(default, deserialize_with = "lenient_text")]
    pub price_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub jewellery_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub product: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub purity: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub occassion: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub metal: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub diamond_clarity: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub collection: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub community: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub metal_colour: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// A filterable attribute dimension, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Facet {
    Gender,
    JewelleryType,
    Product,
    Purity,
    Occassion,
    Metal,
    PriceCategory,
    Type,
    Community,
}

impl Facet {
    pub const ALL: [Self; 9] = [
        Self::Gender,
        Self::JewelleryType,
        Self::Product,
        Self::Purity,
        Self::Occassion,
        Self::Metal,
        Self::PriceCategory,
        Self::Type,
        Self::Community,
    ];

    /// Attribute key, also used as the query parameter name.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::JewelleryType => "jewelleryType",
            Self::Product => "product",
            Self::Purity => "purity",
            Self::Occassion => "occassion",
            Self::Metal => "metal",
            Self::PriceCategory => "priceCategory",
            Self::Type => "type",
            Self::Community => "community",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|facet| facet.key() == key)
    }

    /// Sidebar heading, e.g. `"Jewellery Type"`.
    #[must_use]
    pub fn label(self) -> String {
        facet_label(self.key())
    }

    #[must_use]
    pub const fn options(self) -> &'static [&'static str] {
        match self {
            Self::Gender => &["Kids", "Men", "Women", "Unisex"],
            Self::JewelleryType => &[
                "Diamond Jewellery",
                "Gold Jewellery",
                "Jewellery With Gemstones",
                "Plain Jewellery With Stones",
                "Platinum Jewellery",
            ],
            Self::Product => &[
                "Bangle",
                "Bracelet",
                "Chain",
                "Earrings",
                "Finger Ring",
                "Haram",
                "Jewellery Set",
                "Kada",
                "Maang Tikka",
                "Mangalsutra",
                "Mangalsutra Set",
                "Necklace",
                "Necklace Set",
                "Nose Pin",
                "Others",
                "Pendant",
                "Pendant And Earrings Set",
                "Pendant With Chain",
            ],
            Self::Purity => &["14", "18", "22", "95"],
            Self::Occassion => &[
                "Bridal Wear",
                "Casual Wear",
                "Engagement",
                "Modern Wear",
                "Traditional and Ethnice Wear",
                "Office Wear",
            ],
            Self::Metal => &["Gold", "Platinum", "Diamond"],
            Self::PriceCategory => &["< $5000", "$5000-$9999", "$10,000-$15,000", "> $15,000"],
            Self::Type => &["Drops", "Hoops", "Jhumka", "Studs", "Others"],
            Self::Community => &[
                "Bengali",
                "Bihari",
                "Classic Must Haves",
                "South Indian",
                "Tamil",
                "Telugu",
            ],
        }
    }

    /// The static option equal to `value`, if the facet offers it.
    #[must_use]
    pub fn canonical_option(self, value: &str) -> Option<&'static str> {
        self.options().iter().copied().find(|option| *option == value)
    }

    #[must_use]
    pub fn value_of(self, attributes: &Attributes) -> Option<&str> {
        let value = match self {
            Self::Gender => &attributes.gender,
            Self::JewelleryType => &attributes.jewellery_type,
            Self::Product => &attributes.product,
            Self::Purity => &attributes.purity,
            Self::Occassion => &attributes.occassion,
            Self::Metal => &attributes.metal,
            Self::PriceCategory => &attributes.price_category,
            Self::Type => &attributes.kind,
            Self::Community => &attributes.community,
        };
        value.as_deref()
    }
}

/// Split a camel-case key into title-cased words.
#[must_use]
pub fn facet_label(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if i == 0 {
            label.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            label.push(' ');
            label.push(ch);
        } else {
            label.push(ch);
        }
    }
    label
}

/// Selected options per facet, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    selected: BTreeMap<Facet, Vec<&'static str>>,
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from known facet options. Unknown options are skipped.
    #[must_use]
    pub fn from_selections(selections: &[(Facet, &str)]) -> Self {
        let mut state = Self::new();
        for (facet, option) in selections {
            state.select(*facet, option);
        }
        state
    }

    /// Parse the product list query string. Unknown keys and values are dropped.
    #[must_use]
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut state = Self::new();
        for (key, value) in pairs {
            if let Some(facet) = Facet::from_key(key.as_ref()) {
                state.select(facet, value.as_ref());
            }
        }
        state
    }

    /// Remove `option` if selected, otherwise append it.
    ///
    /// Returns `false` when the facet has no such option.
    pub fn toggle(&mut self, facet: Facet, option: &str) -> bool {
        let Some(option) = facet.canonical_option(option) else {
            return false;
        };
        if self.is_selected(facet, option) {
            self.remove(facet, option);
        } else {
            self.selected.entry(facet).or_default().push(option);
        }
        true
    }

    /// Add `option` unless it is already selected.
    pub fn select(&mut self, facet: Facet, option: &str) {
        if let Some(option) = facet.canonical_option(option) {
            let selected = self.selected.entry(facet).or_default();
            if !selected.contains(&option) {
                selected.push(option);
            }
        }
    }

    pub fn remove(&mut self, facet: Facet, option: &str) {
        if let Some(selected) = self.selected.get_mut(&facet) {
            selected.retain(|o| *o != option);
            if selected.is_empty() {
                self.selected.remove(&facet);
            }
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    #[must_use]
    pub fn is_selected(&self, facet: Facet, option: &str) -> bool {
        self.selections(facet).contains(&option)
    }

    #[must_use]
    pub fn selections(&self, facet: Facet) -> &[&'static str] {
        self.selected.get(&facet).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn count_for(&self, facet: Facet) -> usize {
        self.selections(facet).len()
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.selected.values().map(Vec::len).sum()
    }

    /// Every selection, facet by facet, for the active-filters bar.
    pub fn active(&self) -> impl Iterator<Item = (Facet, &'static str)> + '_ {
        self.selected
            .iter()
            .flat_map(|(facet, options)| options.iter().map(move |option| (*facet, *option)))
    }

    /// OR within a facet, AND across facets. A missing attribute never matches.
    #[must_use]
    pub fn matches(&self, item: &Jewellery) -> bool {
        self.selected.iter().all(|(facet, options)| {
            facet
                .value_of(&item.attributes)
                .is_some_and(|value| options.contains(&value))
        })
    }

    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        self.active().map(|(facet, option)| (facet.key(), option)).collect()
    }

    /// URL query (without the leading `?`).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.to_query_pairs()
            .into_iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// A copy with one option toggled, for building links.
    #[must_use]
    pub fn toggled(&self, facet: Facet, option: &str) -> Self {
        let mut next = self.clone();
        next.toggle(facet, option);
        next
    }

    /// A copy with one option removed.
    #[must_use]
    pub fn without(&self, facet: Facet, option: &str) -> Self {
        let mut next = self.clone();
        next.remove(facet, option);
        next
    }

    /// Product list URL showing exactly this selection.
    #[must_use]
    pub fn href(&self) -> String {
        if self.is_empty() {
            PRODUCTS_PATH.to_string()
        } else {
            format!("{PRODUCTS_PATH}?{}", self.to_query_string())
        }
    }
}

/// Case-insensitive name search. A blank query matches everything.
#[must_use]
pub fn matches_search(item: &Jewellery, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || item.name.to_lowercase().contains(&query.to_lowercase())
}

/// Items passing both the facet filters and the optional search text.
#[must_use]
pub fn filter_catalog<'a>(
    items: &'a [Jewellery],
    filters: &FilterState,
    query: Option<&str>,
) -> Vec<&'a Jewellery> {
    items
        .iter()
        .filter(|item| filters.matches(item))
        .filter(|item| query.is_none_or(|q| matches_search(item, q)))
        .collect()
}

/// How many catalog items carry one facet option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCount {
    pub facet: Facet,
    pub option: &'static str,
    pub count: usize,
}

/// Item counts for every facet option, in sidebar order.
#[must_use]
pub fn option_counts(items: &[Jewellery]) -> Vec<OptionCount> {
    Facet::ALL
        .into_iter()
        .flat_map(|facet| {
            facet.options().iter().copied().map(move |option| OptionCount {
                facet,
                option,
                count: items
                    .iter()
                    .filter(|item| facet.value_of(&item.attributes) == Some(option))
                    .count(),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, gender: &str, metal: Option<&str>) -> Jewellery {
        Jewellery {
            id: JewelleryId::new(id),
            name: name.to_string(),
            price: Decimal::new(4999, 0),
            num_in_stock: 10,
            image_id: format!("img-{id}"),
            description: None,
            attributes: Attributes {
                gender: Some(gender.to_string()),
                metal: metal.map(str::to_string),
                ..Attributes::default()
            },
        }
    }

    #[test]
    fn test_facet_labels_split_camel_case() {
        assert_eq!(Facet::JewelleryType.label(), "Jewellery Type");
        assert_eq!(Facet::PriceCategory.label(), "Price Category");
        assert_eq!(Facet::Type.label(), "Type");
    }

    #[test]
    fn test_facet_keys_round_trip() {
        for facet in Facet::ALL {
            assert_eq!(Facet::from_key(facet.key()), Some(facet));
        }
        assert_eq!(Facet::from_key("brand"), None);
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut state = FilterState::new();
        assert!(state.toggle(Facet::Gender, "Women"));
        assert!(state.is_selected(Facet::Gender, "Women"));
        assert_eq!(state.active_count(), 1);

        assert!(state.toggle(Facet::Gender, "Women"));
        assert!(state.is_empty());
    }

    #[test]
    fn test_toggle_ignores_unknown_options() {
        let mut state = FilterState::new();
        assert!(!state.toggle(Facet::Metal, "Silver"));
        assert!(state.is_empty());
    }

    #[test]
    fn test_clear_empties_every_facet() {
        let mut state = FilterState::new();
        state.toggle(Facet::Gender, "Men");
        state.toggle(Facet::Metal, "Gold");
        state.toggle(Facet::Metal, "Platinum");
        assert_eq!(state.count_for(Facet::Metal), 2);
        assert_eq!(state.active_count(), 3);

        state.clear();
        assert_eq!(state.active_count(), 0);
    }

    #[test]
    fn test_matches_or_within_and_across_facets() {
        let ring = item(1, "Rose Ring", "Women", Some("Gold"));
        let chain = item(2, "Box Chain", "Men", Some("Platinum"));
        let kids = item(3, "Tiny Studs", "Kids", Some("Gold"));

        let mut state = FilterState::new();
        state.toggle(Facet::Gender, "Women");
        state.toggle(Facet::Gender, "Men");
        assert!(state.matches(&ring));
        assert!(state.matches(&chain));
        assert!(!state.matches(&kids));

        state.toggle(Facet::Metal, "Gold");
        assert!(state.matches(&ring));
        assert!(!state.matches(&chain));
    }

    #[test]
    fn test_missing_attribute_never_matches_selection() {
        let plain = item(4, "Plain Band", "Unisex", None);
        let state = FilterState::from_selections(&[(Facet::Metal, "Gold")]);
        assert!(!state.matches(&plain));
        assert!(FilterState::new().matches(&plain));
    }

    #[test]
    fn test_query_string_encodes_values() {
        let state = FilterState::from_selections(&[
            (Facet::Gender, "Women"),
            (Facet::PriceCategory, "< $5000"),
        ]);
        assert_eq!(
            state.to_query_string(),
            "gender=Women&priceCategory=%3C%20%245000"
        );
    }

    #[test]
    fn test_from_query_pairs_drops_unknown_and_duplicates() {
        let state = FilterState::from_query_pairs([
            ("gender", "Women"),
            ("gender", "Women"),
            ("metal", "Silver"),
            ("q", "ring"),
            ("community", "Tamil"),
        ]);
        assert_eq!(
            state.to_query_pairs(),
            vec![("gender", "Women"), ("community", "Tamil")]
        );
    }

    #[test]
    fn test_toggled_and_without_leave_state_untouched() {
        let state = FilterState::from_selections(&[(Facet::Metal, "Gold")]);
        assert_eq!(
            state.toggled(Facet::Gender, "Men").to_query_string(),
            "gender=Men&metal=Gold"
        );
        assert!(state.toggled(Facet::Metal, "Gold").is_empty());
        assert!(state.without(Facet::Metal, "Gold").is_empty());
        assert_eq!(state.active_count(), 1);
    }

    #[test]
    fn test_href_for_empty_and_filtered_state() {
        assert_eq!(FilterState::new().href(), "/products-list");
        let state = FilterState::from_selections(&[(Facet::Product, "Nose Pin")]);
        assert_eq!(state.href(), "/products-list?product=Nose%20Pin");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let items = vec![
            item(1, "Rose Gold Ring", "Women", Some("Gold")),
            item(2, "Temple Necklace", "Women", Some("Gold")),
        ];
        let found = filter_catalog(&items, &FilterState::new(), Some("  rInG "));
        assert_eq!(found.len(), 1);
        assert_eq!(found.first().map(|i| i.id), Some(JewelleryId::new(1)));
        assert_eq!(filter_catalog(&items, &FilterState::new(), Some("")).len(), 2);
    }

    #[test]
    fn test_stock_badge_below_threshold() {
        let mut low = item(5, "Studs", "Women", None);
        low.num_in_stock = 3;
        assert_eq!(
            low.stock_badge().as_deref(),
            Some("Selling Fast! Only 3 left in stock")
        );
        low.num_in_stock = 5;
        assert_eq!(low.stock_badge(), None);
    }

    #[test]
    fn test_attributes_decode_numbers_and_blanks() {
        let attrs: Attributes = serde_json::from_str(
            r#"{"purity": 22, "metal": "Gold", "gender": "", "type": "Jhumka", "brand": null}"#,
        )
        .unwrap();
        assert_eq!(attrs.purity.as_deref(), Some("22"));
        assert_eq!(attrs.metal.as_deref(), Some("Gold"));
        assert_eq!(attrs.gender, None);
        assert_eq!(attrs.kind.as_deref(), Some("Jhumka"));
        assert_eq!(attrs.brand, None);
    }

    #[test]
    fn test_option_counts_cover_every_option() {
        let items = vec![
            item(1, "A", "Women", Some("Gold")),
            item(2, "B", "Women", Some("Diamond")),
        ];
        let counts = option_counts(&items);
        let total_options: usize = Facet::ALL.iter().map(|f| f.options().len()).sum();
        assert_eq!(counts.len(), total_options);
        let women = counts
            .iter()
            .find(|c| c.facet == Facet::Gender && c.option == "Women")
            .unwrap();
        assert_eq!(women.count, 2);
    }
}

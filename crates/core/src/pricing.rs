//! Price breakdown table.
//!
//! Each product has a list of breakdown rows (metal, stones, making charges,
//! tax, and a closing total row). The backend computes every number; this
//! module only decides how each cell reads.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{format_amount, format_table_dollars};

/// One line of a product's price breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRow {
    pub product_detail: String,
    #[serde(default)]
    pub product_icon: Option<String>,
    #[serde(default)]
    pub product_subtitle: Option<String>,
    #[serde(default)]
    pub rate: Option<RowRate>,
    #[serde(default)]
    pub weight: Option<Weight>,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub value: Decimal,
    #[serde(default)]
    pub is_total: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRate {
    pub value: Decimal,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weight {
    #[serde(default)]
    pub carat: Option<Decimal>,
    #[serde(default)]
    pub gram: Decimal,
}

impl PriceRow {
    #[must_use]
    pub fn is_total(&self) -> bool {
        self.is_total.unwrap_or(false)
    }

    /// Icon URL, hidden on the total row.
    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.product_icon.as_deref().filter(|_| !self.is_total())
    }

    /// Subtitle, hidden on the total row.
    #[must_use]
    pub fn subtitle(&self) -> Option<&str> {
        self.product_subtitle.as_deref().filter(|_| !self.is_total())
    }
}

/// Current price of one metal, from the `Rates` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetalRate {
    pub metal_name: String,
    pub rate: Decimal,
    pub unit: String,
}

/// Metal rates keyed by metal name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rates(HashMap<String, MetalRate>);

impl Rates {
    #[must_use]
    pub fn get(&self, metal_name: &str) -> Option<&MetalRate> {
        self.0.get(metal_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<MetalRate> for Rates {
    fn from_iter<I: IntoIterator<Item = MetalRate>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|rate| (rate.metal_name.clone(), rate))
                .collect(),
        )
    }
}

/// RATE column: the metal's current rate when the row names a known metal.
#[must_use]
pub fn rate_cell(row: &PriceRow, rates: &Rates) -> String {
    match rates.get(&row.product_detail) {
        Some(rate) => format!("{} / {}", format_table_dollars(rate.rate), rate.unit),
        None if row.is_total() => String::new(),
        None => "-".to_string(),
    }
}

/// WEIGHT column.
#[must_use]
pub fn weight_cell(row: &PriceRow) -> String {
    let Some(weight) = &row.weight else {
        return "-".to_string();
    };
    match weight.carat.filter(|carat| !carat.is_zero()) {
        Some(carat) => format!(
            "{} ct/ {}g",
            format_amount(carat),
            format_amount(weight.gram)
        ),
        None if weight.gram > Decimal::ZERO => format!("{}g", format_amount(weight.gram)),
        None => String::new(),
    }
}

/// DISCOUNT column, blank when nothing was taken off.
#[must_use]
pub fn discount_cell(row: &PriceRow) -> String {
    if row.discount.is_zero() {
        String::new()
    } else {
        format_table_dollars(row.discount)
    }
}

/// VALUE column.
#[must_use]
pub fn value_cell(row: &PriceRow) -> String {
    format_table_dollars(row.value)
}

/// Grand total: the first total row's value, or zero.
#[must_use]
pub fn total(rows: &[PriceRow]) -> Decimal {
    rows.iter()
        .find(|row| row.is_total())
        .map_or(Decimal::ZERO, |row| row.value)
}

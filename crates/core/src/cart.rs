//! Cart arithmetic.
//!
//! The backend stores a cart as a bare list of product ids. Quantities and
//! modification notes are visitor-local; they are clamped against stock here
//! and never written back.

use rust_decimal::Decimal;

use crate::types::{JewelleryId, format_dollars};

/// A product in the visitor's cart, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub id: JewelleryId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub max_quantity: i32,
    pub cover_image: String,
    pub modifications: String,
}

impl CartLine {
    /// A fresh line at quantity 1 (0 when out of stock).
    #[must_use]
    pub fn new(
        id: JewelleryId,
        name: String,
        price: Decimal,
        max_quantity: i32,
        cover_image: String,
    ) -> Self {
        let mut line = Self {
            id,
            name,
            price,
            quantity: 1,
            max_quantity,
            cover_image,
            modifications: String::new(),
        };
        line.set_quantity(1);
        line
    }

    /// Clamp to `min(max(1, n), max_quantity)`.
    pub fn set_quantity(&mut self, quantity: i32) {
        self.quantity = quantity.max(1).min(self.max_quantity.max(0));
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.max_quantity > 0
    }

    #[must_use]
    pub const fn can_increase(&self) -> bool {
        self.quantity < self.max_quantity
    }

    #[must_use]
    pub const fn can_decrease(&self) -> bool {
        self.quantity > 1
    }

    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    #[must_use]
    pub fn formatted_price(&self) -> String {
        format_dollars(self.price)
    }

    #[must_use]
    pub fn formatted_total(&self) -> String {
        format_dollars(self.line_total())
    }
}

#[must_use]
pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}

/// `ids` with every occurrence of `id` removed.
#[must_use]
pub fn without(ids: &[JewelleryId], id: JewelleryId) -> Vec<JewelleryId> {
    ids.iter().copied().filter(|existing| *existing != id).collect()
}

/// `ids` with `id` appended unless already present.
#[must_use]
pub fn with(ids: &[JewelleryId], id: JewelleryId) -> Vec<JewelleryId> {
    let mut next = ids.to_vec();
    if !next.contains(&id) {
        next.push(id);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(max: i32) -> CartLine {
        CartLine::new(
            JewelleryId::new(7),
            "Lotus Pendant".to_string(),
            Decimal::new(12_500, 0),
            max,
            "https://cdn.example/med-res/7/1.svg".to_string(),
        )
    }

    #[test]
    fn test_quantity_clamped_to_stock() {
        let mut l = line(3);
        assert_eq!(l.quantity, 1);

        l.set_quantity(10);
        assert_eq!(l.quantity, 3);
        assert!(!l.can_increase());

        l.set_quantity(-4);
        assert_eq!(l.quantity, 1);
        assert!(!l.can_decrease());
    }

    #[test]
    fn test_out_of_stock_line_sits_at_zero() {
        let mut l = line(0);
        assert_eq!(l.quantity, 0);
        assert!(!l.in_stock());
        l.set_quantity(2);
        assert_eq!(l.quantity, 0);
        assert_eq!(l.line_total(), Decimal::ZERO);
    }

    #[test]
    fn test_totals() {
        let mut a = line(5);
        a.set_quantity(2);
        let b = CartLine::new(
            JewelleryId::new(8),
            "Stud".to_string(),
            Decimal::new(999, 0),
            1,
            String::new(),
        );
        assert_eq!(a.formatted_total(), "$25,000");
        assert_eq!(cart_total(&[a, b]), Decimal::new(25_999, 0));
        assert_eq!(cart_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_without_removes_every_occurrence() {
        let ids = [1, 2, 1, 3].map(JewelleryId::new);
        assert_eq!(without(&ids, JewelleryId::new(1)), [2, 3].map(JewelleryId::new));
        assert_eq!(without(&ids, JewelleryId::new(9)).len(), 4);
    }

    #[test]
    fn test_with_appends_once() {
        let ids = [4].map(JewelleryId::new);
        let added = with(&ids, JewelleryId::new(5));
        assert_eq!(added, [4, 5].map(JewelleryId::new));
        assert_eq!(with(&added, JewelleryId::new(4)), added);
    }
}

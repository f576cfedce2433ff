//! Category mega-menu.
//!
//! Top-level categories sit in the bar under the navbar; hovering one opens
//! its sub-category groups. Sub-categories backed by catalog facet options
//! link to the filtered product list, the rest to the whole catalog.

use crate::catalog::{Facet, FilterState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub id: &'static str,
    pub name: &'static str,
    pub filters: &'static [(Facet, &'static str)],
}

impl MenuItem {
    #[must_use]
    pub fn href(&self) -> String {
        FilterState::from_selections(self.filters).href()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuGroup {
    pub title: &'static str,
    pub items: &'static [MenuItem],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub filters: &'static [(Facet, &'static str)],
    pub groups: &'static [MenuGroup],
}

impl MenuCategory {
    #[must_use]
    pub fn href(&self) -> String {
        FilterState::from_selections(self.filters).href()
    }

    /// Groups that have at least one entry.
    pub fn non_empty_groups(&self) -> impl Iterator<Item = &MenuGroup> {
        self.groups.iter().filter(|group| !group.items.is_empty())
    }
}

const fn item(
    id: &'static str,
    name: &'static str,
    filters: &'static [(Facet, &'static str)],
) -> MenuItem {
    MenuItem { id, name, filters }
}

const ALL_CATEGORY: &[MenuItem] = &[
    item("all-jewelry", "All Jewelry", &[]),
    item("all-earrings", "Earrings", &[(Facet::Product, "Earrings")]),
    item("all-pendants", "Pendants", &[(Facet::Product, "Pendant")]),
    item("all-finger-rings", "Finger Rings", &[(Facet::Product, "Finger Ring")]),
    item("all-mangalsutra", "Mangalsutra", &[(Facet::Product, "Mangalsutra")]),
    item("all-chains", "Chains", &[(Facet::Product, "Chain")]),
    item("all-nose-pins", "Nose Pins", &[(Facet::Product, "Nose Pin")]),
    item("all-necklace", "Necklaces", &[(Facet::Product, "Necklace")]),
    item("all-necklace-set", "Necklace Sets", &[(Facet::Product, "Necklace Set")]),
    item("all-bangles", "Bangles", &[(Facet::Product, "Bangle")]),
    item("all-bracelets", "Bracelets", &[(Facet::Product, "Bracelet")]),
    item(
        "all-pendants-and-earring-set",
        "Pendants & Earring Set",
        &[(Facet::Product, "Pendant And Earrings Set")],
    ),
    item("all-gold-coins", "Gold Coins", &[]),
];

const ALL_GENDER: &[MenuItem] = &[
    item("men", "Men", &[(Facet::Gender, "Men")]),
    item("women", "Women", &[(Facet::Gender, "Women")]),
    item("kids", "Kids", &[(Facet::Gender, "Kids")]),
];

// Bands above 10k have no matching price category.
const ALL_PRICE_BAND: &[MenuItem] = &[
    item("below5k", "Below 5k", &[(Facet::PriceCategory, "< $5000")]),
    item("5kto10k", "5k to 10k", &[(Facet::PriceCategory, "$5000-$9999")]),
    item("10kto20k", "10k to 20k", &[]),
    item("20kto30k", "20k to 30k", &[]),
    item("30k-and-above", "30k and Above", &[]),
];

const GOLD_CATEGORY: &[MenuItem] = &[
    item("gold-bangles", "Bangles", &[(Facet::Metal, "Gold"), (Facet::Product, "Bangle")]),
    item("gold-bracelets", "Bracelets", &[(Facet::Metal, "Gold"), (Facet::Product, "Bracelet")]),
    item("gold-chains", "Gold Chains", &[(Facet::Metal, "Gold"), (Facet::Product, "Chain")]),
    item("gold-earrings", "Earrings", &[(Facet::Metal, "Gold"), (Facet::Product, "Earrings")]),
    item("gold-pendants", "Pendants", &[(Facet::Metal, "Gold"), (Facet::Product, "Pendant")]),
    item("gold-rings", "Rings", &[(Facet::Metal, "Gold"), (Facet::Product, "Finger Ring")]),
    item(
        "gold-engagement-rings",
        "Engagement Rings",
        &[(Facet::Metal, "Gold"), (Facet::Occassion, "Engagement")],
    ),
    item("gold-necklaces", "Necklaces", &[(Facet::Metal, "Gold"), (Facet::Product, "Necklace")]),
    item("gold-nose-pins", "Nose Pins", &[(Facet::Metal, "Gold"), (Facet::Product, "Nose Pin")]),
    item("gold-kadas", "Kadas", &[(Facet::Metal, "Gold"), (Facet::Product, "Kada")]),
    item(
        "gold-mangalsutra",
        "Mangalsutra",
        &[(Facet::Metal, "Gold"), (Facet::Product, "Mangalsutra")],
    ),
    item("gold-jhumkas", "Jhumkas", &[(Facet::Metal, "Gold"), (Facet::Type, "Jhumka")]),
];

const MENU: &[MenuCategory] = &[
    MenuCategory {
        id: "all-jewelry",
        name: "All Jewelry",
        filters: &[],
        groups: &[
            MenuGroup {
                title: "Category",
                items: ALL_CATEGORY,
            },
            MenuGroup {
                title: "Gender",
                items: ALL_GENDER,
            },
            MenuGroup {
                title: "Price Band",
                items: ALL_PRICE_BAND,
            },
        ],
    },
    MenuCategory {
        id: "gold",
        name: "Gold",
        filters: &[(Facet::Metal, "Gold")],
        groups: &[MenuGroup {
            title: "Category",
            items: GOLD_CATEGORY,
        }],
    },
    MenuCategory {
        id: "diamond",
        name: "Diamond",
        filters: &[(Facet::Metal, "Diamond")],
        groups: &[MenuGroup {
            title: "Category",
            items: &[],
        }],
    },
    MenuCategory {
        id: "earrings",
        name: "Earrings",
        filters: &[(Facet::Product, "Earrings")],
        groups: &[MenuGroup {
            title: "Category",
            items: &[],
        }],
    },
    MenuCategory {
        id: "rings",
        name: "Rings",
        filters: &[(Facet::Product, "Finger Ring")],
        groups: &[MenuGroup {
            title: "Category",
            items: &[],
        }],
    },
];

/// The full category menu, in display order.
#[must_use]
pub const fn menu() -> &'static [MenuCategory] {
    MENU
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn all_items() -> impl Iterator<Item = &'static MenuItem> {
        menu()
            .iter()
            .flat_map(|category| category.groups.iter())
            .flat_map(|group| group.items.iter())
    }

    #[test]
    fn test_menu_order() {
        let names: Vec<_> = menu().iter().map(|c| c.name).collect();
        assert_eq!(names, ["All Jewelry", "Gold", "Diamond", "Earrings", "Rings"]);
    }

    #[test]
    fn test_every_filter_names_a_real_option() {
        for item in all_items() {
            for (facet, option) in item.filters {
                assert!(
                    facet.canonical_option(option).is_some(),
                    "{} -> {option}",
                    item.id
                );
            }
        }
    }

    #[test]
    fn test_links() {
        let gold_chains = all_items().find(|i| i.id == "gold-chains").unwrap();
        assert_eq!(
            gold_chains.href(),
            "/products-list?product=Chain&metal=Gold"
        );
        let coins = all_items().find(|i| i.id == "all-gold-coins").unwrap();
        assert_eq!(coins.href(), "/products-list");
    }

    #[test]
    fn test_empty_groups_hidden() {
        let diamond = menu().iter().find(|c| c.id == "diamond").unwrap();
        assert_eq!(diamond.non_empty_groups().count(), 0);
        assert_eq!(diamond.href(), "/products-list?metal=Diamond");
    }
}

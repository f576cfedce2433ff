//! Nalan Jewel Core - Shared domain library.
//!
//! This crate holds the storefront's domain logic that does not touch the
//! network:
//! - `storefront` - Public-facing jewellery shop (Axum + Askama)
//! - `cli` - Operator tooling for migrations and catalog inspection
//!
//! # Architecture
//!
//! Everything here is plain data and pure functions. Backend rows are decoded
//! by the storefront and converted into these types before any filtering,
//! pricing, or cart arithmetic happens.
//!
//! # Modules
//!
//! - [`types`] - IDs, emails, money formatting, and order statuses
//! - [`catalog`] - Jewellery records, facets, and filter state
//! - [`pricing`] - Price breakdown table cells
//! - [`cart`] - Cart line arithmetic
//! - [`orders`] - Order history display rules
//! - [`navigation`] - Category mega-menu

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod navigation;
pub mod orders;
pub mod pricing;
pub mod types;

pub use types::*;

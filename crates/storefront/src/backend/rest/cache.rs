//! Cache types for catalog reads.

use std::sync::Arc;

use nalan_core::JewelleryId;
use nalan_core::catalog::Jewellery;
use nalan_core::pricing::{PriceRow, Rates};

/// Cache key for catalog data. User-keyed reads never get a key.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Catalog,
    Jewellery(JewelleryId),
    PriceRows(JewelleryId),
    Rates,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Catalog(Arc<Vec<Jewellery>>),
    Jewellery(Box<Jewellery>),
    PriceRows(Arc<Vec<PriceRow>>),
    Rates(Arc<Rates>),
}

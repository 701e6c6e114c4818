//! Cache keys for catalog listings.

use grips_gears_core::ProductCategory;

/// Cache key for product listings.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CatalogKey {
    Category(ProductCategory),
    All,
}

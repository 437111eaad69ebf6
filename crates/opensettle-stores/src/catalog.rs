//! Catalog reader seam.
//!
//! Product listings are owned by the marketplace subsystems outside the
//! engine. The coordinator reads a [`ProductSnapshot`] during validation
//! and re-checks through the inventory service for the actual decrement
//! — the snapshot is never trusted for stock.

use std::collections::HashMap;
use std::sync::RwLock;

use opensettle_types::{ProductId, ProductSnapshot};

/// Read-only access to product listings.
pub trait CatalogReader: Send + Sync {
    /// A point-in-time snapshot of the product, if it exists.
    fn product(&self, product_id: ProductId) -> Option<ProductSnapshot>;
}

/// In-memory catalog for tests, demos, and single-process deployments.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    products: RwLock<HashMap<ProductId, ProductSnapshot>>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a listing.
    pub fn insert(&self, snapshot: ProductSnapshot) {
        if let Ok(mut products) = self.products.write() {
            products.insert(snapshot.id, snapshot);
        }
    }

    /// Flip a listing's active flag. Unknown ids are ignored.
    pub fn set_active(&self, product_id: ProductId, is_active: bool) {
        if let Ok(mut products) = self.products.write() {
            if let Some(snapshot) = products.get_mut(&product_id) {
                snapshot.is_active = is_active;
            }
        }
    }

    /// Number of listings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.read().map(|p| p.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CatalogReader for StaticCatalog {
    fn product(&self, product_id: ProductId) -> Option<ProductSnapshot> {
        self.products
            .read()
            .ok()
            .and_then(|products| products.get(&product_id).cloned())
    }
}

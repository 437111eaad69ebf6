//! Catalog snapshot types.
//!
//! Products are owned by the listing subsystems, not the engine. The
//! engine reads a [`ProductSnapshot`] during validation and performs the
//! authoritative stock check through the Inventory Reservation Service —
//! the snapshot is advisory, never trusted for the actual decrement.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ProductId, UserId};

/// Read-only view of a listed product, served by a `CatalogReader`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    /// The seller (or business account) that listed this product.
    pub owner_id: UserId,
    pub price: Decimal,
    /// Tracked stock level. `None` means unlimited / untracked.
    pub stock_quantity: Option<u32>,
    /// Whether the listing is currently purchasable.
    pub is_active: bool,
}

impl ProductSnapshot {
    /// Whether the snapshot suggests the requested quantity is available.
    /// Only a hint — the reservation service performs the real check.
    #[must_use]
    pub fn appears_available(&self, quantity: u32) -> bool {
        self.is_active && self.stock_quantity.is_none_or(|stock| stock >= quantity)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl ProductSnapshot {
    pub fn dummy(owner_id: UserId, price: Decimal, stock_quantity: Option<u32>) -> Self {
        Self {
            id: ProductId::new(),
            owner_id,
            price,
            stock_quantity,
            is_active: true,
        }
    }
}

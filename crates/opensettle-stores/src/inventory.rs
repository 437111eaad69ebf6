//! Inventory reservation service.
//!
//! Reservation is an atomic check-and-decrement inside one critical
//! section: two concurrent requests can never both pass the stock check
//! against stale data. A naive read-then-write without that isolation
//! would be a correctness bug, not a simplification.
//!
//! Unlimited-stock products (`stock = None`) always reserve successfully
//! and are never decremented; their tokens release as a no-op.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use opensettle_types::{ProductId, Result, SettleError};
use rust_decimal::Decimal;

/// A provisional, reversible hold against product stock.
///
/// Returned by [`InventoryService::reserve`]; pass it back to
/// [`InventoryService::release`] to compensate a partial reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationToken {
    pub product_id: ProductId,
    pub quantity: u32,
    /// False for unlimited-stock products: nothing was decremented, so
    /// release has nothing to restore.
    pub tracked: bool,
}

/// Owns per-product stock counters; enforces the non-negative stock
/// invariant. Stock is `u32`, so negative stock is unrepresentable, and
/// the reserve path guarantees no underflow.
#[derive(Debug, Default)]
pub struct InventoryService {
    inner: Mutex<HashMap<ProductId, Option<u32>>>,
}

impl InventoryService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<ProductId, Option<u32>>>> {
        self.inner
            .lock()
            .map_err(|_| SettleError::StoreUnavailable("inventory store lock poisoned".into()))
    }

    /// Seed (or reset) the stock counter for a product. `None` means
    /// unlimited / untracked stock.
    pub fn register(&self, product_id: ProductId, stock: Option<u32>) -> Result<()> {
        self.lock()?.insert(product_id, stock);
        Ok(())
    }

    /// Current stock counter. `Ok(None)` means unlimited.
    ///
    /// # Errors
    /// Returns `ProductNotFound` for unregistered products.
    pub fn stock(&self, product_id: ProductId) -> Result<Option<u32>> {
        self.lock()?
            .get(&product_id)
            .copied()
            .ok_or(SettleError::ProductNotFound(product_id))
    }

    /// Atomically check and decrement stock.
    ///
    /// # Errors
    /// - `InvalidAmount` for a zero quantity
    /// - `ProductNotFound` for unregistered products
    /// - `InsufficientStock` when the counter cannot cover the request
    pub fn reserve(&self, product_id: ProductId, quantity: u32) -> Result<ReservationToken> {
        if quantity == 0 {
            return Err(SettleError::InvalidAmount {
                amount: Decimal::ZERO,
            });
        }
        let mut inner = self.lock()?;
        let stock = inner
            .get_mut(&product_id)
            .ok_or(SettleError::ProductNotFound(product_id))?;

        match stock {
            None => Ok(ReservationToken {
                product_id,
                quantity,
                tracked: false,
            }),
            Some(available) => {
                if *available < quantity {
                    return Err(SettleError::InsufficientStock {
                        product_id,
                        requested: quantity,
                        available: *available,
                    });
                }
                *available -= quantity;
                tracing::debug!(
                    product = %product_id,
                    reserved = quantity,
                    remaining = *available,
                    "Stock reserved"
                );
                Ok(ReservationToken {
                    product_id,
                    quantity,
                    tracked: true,
                })
            }
        }
    }

    /// Compensating increment for a prior reservation. Releasing an
    /// untracked token is a no-op; releasing against a product that was
    /// re-registered as unlimited is also a no-op.
    pub fn release(&self, token: &ReservationToken) -> Result<()> {
        if !token.tracked {
            return Ok(());
        }
        let mut inner = self.lock()?;
        let stock = inner
            .get_mut(&token.product_id)
            .ok_or(SettleError::ProductNotFound(token.product_id))?;
        if let Some(available) = stock {
            *available = available.saturating_add(token.quantity);
            tracing::debug!(
                product = %token.product_id,
                released = token.quantity,
                remaining = *available,
                "Stock released"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_decrements_tracked_stock() {
        let service = InventoryService::new();
        let product = ProductId::new();
        service.register(product, Some(5)).unwrap();

        let token = service.reserve(product, 3).unwrap();
        assert!(token.tracked);
        assert_eq!(service.stock(product).unwrap(), Some(2));
    }

    #[test]
    fn reserve_insufficient_stock() {
        let service = InventoryService::new();
        let product = ProductId::new();
        service.register(product, Some(1)).unwrap();

        let err = service.reserve(product, 2).unwrap_err();
        assert!(matches!(
            err,
            SettleError::InsufficientStock {
                requested: 2,
                available: 1,
                ..
            }
        ));
        // Counter untouched by the failed attempt.
        assert_eq!(service.stock(product).unwrap(), Some(1));
    }

    #[test]
    fn unlimited_stock_never_decrements() {
        let service = InventoryService::new();
        let product = ProductId::new();
        service.register(product, None).unwrap();

        let token = service.reserve(product, 10_000).unwrap();
        assert!(!token.tracked);
        assert_eq!(service.stock(product).unwrap(), None);

        // Release of an untracked token is a no-op.
        service.release(&token).unwrap();
        assert_eq!(service.stock(product).unwrap(), None);
    }

    #[test]
    fn release_restores_stock() {
        let service = InventoryService::new();
        let product = ProductId::new();
        service.register(product, Some(5)).unwrap();

        let token = service.reserve(product, 5).unwrap();
        assert_eq!(service.stock(product).unwrap(), Some(0));

        service.release(&token).unwrap();
        assert_eq!(service.stock(product).unwrap(), Some(5));
    }

    #[test]
    fn last_unit_goes_to_exactly_one() {
        let service = InventoryService::new();
        let product = ProductId::new();
        service.register(product, Some(1)).unwrap();

        let first = service.reserve(product, 1);
        let second = service.reserve(product, 1);
        assert!(first.is_ok());
        assert!(matches!(
            second.unwrap_err(),
            SettleError::InsufficientStock { available: 0, .. }
        ));
        assert_eq!(service.stock(product).unwrap(), Some(0));
    }

    #[test]
    fn unknown_product_errors() {
        let service = InventoryService::new();
        let err = service.reserve(ProductId::new(), 1).unwrap_err();
        assert!(matches!(err, SettleError::ProductNotFound(_)));
    }

    #[test]
    fn zero_quantity_rejected() {
        let service = InventoryService::new();
        let product = ProductId::new();
        service.register(product, Some(5)).unwrap();
        let err = service.reserve(product, 0).unwrap_err();
        assert!(matches!(err, SettleError::InvalidAmount { .. }));
    }
}

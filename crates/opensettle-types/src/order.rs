//! Order types for the OpenSettle settlement engine.
//!
//! An [`Order`] abstracts both a generic marketplace purchase and a
//! multi-item business-vendor order. The Settlement Coordinator creates
//! orders in `Pending` and moves them through the lifecycle below; once
//! an order is `Paid` its lines are immutable and it never goes back.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MarketplaceKind, OrderId, ProductId, UserId};

/// Lifecycle status of an order.
///
/// Transitions are **monotonic** (never go backwards):
/// - `Pending → Paid` (settlement committed)
/// - `Pending → Failed` (insufficient funds or stock, fully compensated)
/// - `Pending → Cancelled` (aborted before committing)
/// - `Paid → Delivered` (fulfilment confirmed outside the engine)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
    Cancelled,
    Delivered,
}

impl OrderStatus {
    /// Can an order in this status transition to the given target?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (
                Self::Pending,
                Self::Paid | Self::Failed | Self::Cancelled
            ) | (Self::Paid, Self::Delivered)
        )
    }

    /// Whether this status is an end state of the lifecycle.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled | Self::Delivered)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Paid => write!(f, "PAID"),
            Self::Failed => write!(f, "FAILED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Delivered => write!(f, "DELIVERED"),
        }
    }
}

/// One line of an order: a product, how many, and the unit price that
/// was current when the order was validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderLine {
    #[must_use]
    pub fn new(product_id: ProductId, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
        }
    }

    /// `unit_price × quantity`. Summed (not rounded) per line; fee
    /// rounding happens once on the order total.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A settled or in-flight order with its line-item summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: UserId,
    /// Seller account, or the business account for vendor orders.
    pub seller_id: UserId,
    pub marketplace: MarketplaceKind,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    /// Gross amount debited from the buyer: Σ line totals.
    pub total_amount: Decimal,
    /// Platform fee withheld from the seller's proceeds.
    pub fee_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order in `Pending` with totals derived from its lines.
    /// `fee_amount` stays zero until the fee policy is applied.
    #[must_use]
    pub fn pending(
        buyer_id: UserId,
        seller_id: UserId,
        marketplace: MarketplaceKind,
        lines: Vec<OrderLine>,
    ) -> Self {
        let total_amount = lines.iter().map(OrderLine::line_total).sum();
        Self {
            id: OrderId::new(),
            buyer_id,
            seller_id,
            marketplace,
            status: OrderStatus::Pending,
            lines,
            total_amount,
            fee_amount: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    /// Net amount the seller receives after the platform fee.
    #[must_use]
    pub fn net_amount(&self) -> Decimal {
        self.total_amount - self.fee_amount
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Apply a status transition, enforcing the lifecycle guard.
    ///
    /// # Errors
    /// Returns [`crate::SettleError::InvalidTransition`] if the
    /// lifecycle forbids the move (e.g. anything leaving `Paid` other
    /// than `Delivered`).
    pub fn transition_to(&mut self, target: OrderStatus) -> crate::Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(crate::SettleError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn dummy(buyer_id: UserId, seller_id: UserId, unit_price: Decimal, quantity: u32) -> Self {
        Self::pending(
            buyer_id,
            seller_id,
            MarketplaceKind::General,
            vec![OrderLine::new(ProductId::new(), quantity, unit_price)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_order_totals_from_lines() {
        let lines = vec![
            OrderLine::new(ProductId::new(), 2, Decimal::new(250, 0)),
            OrderLine::new(ProductId::new(), 1, Decimal::new(100, 0)),
        ];
        let order = Order::pending(UserId::new(), UserId::new(), MarketplaceKind::General, lines);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, Decimal::new(600, 0));
        assert_eq!(order.total_quantity(), 3);
    }

    #[test]
    fn valid_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Paid));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Failed));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn paid_never_goes_back() {
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Failed));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Failed.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Paid));
    }

    #[test]
    fn transition_guard_enforced() {
        let mut order = Order::dummy(UserId::new(), UserId::new(), Decimal::new(500, 0), 1);
        order.transition_to(OrderStatus::Paid).unwrap();
        let err = order.transition_to(OrderStatus::Pending).unwrap_err();
        assert!(matches!(
            err,
            crate::SettleError::InvalidTransition {
                from: OrderStatus::Paid,
                to: OrderStatus::Pending,
            }
        ));
        assert_eq!(order.status, OrderStatus::Paid);
    }

    #[test]
    fn net_amount_subtracts_fee() {
        let mut order = Order::dummy(UserId::new(), UserId::new(), Decimal::new(500, 0), 1);
        order.fee_amount = Decimal::new(10, 0);
        assert_eq!(order.net_amount(), Decimal::new(490, 0));
    }

    #[test]
    fn status_display() {
        assert_eq!(format!("{}", OrderStatus::Paid), "PAID");
        assert_eq!(format!("{}", OrderStatus::Delivered), "DELIVERED");
    }

    #[test]
    fn serde_roundtrip() {
        let order = Order::dummy(UserId::new(), UserId::new(), Decimal::new(999, 2), 3);
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
    }
}

//! Error types for the OpenSettle settlement engine.
//!
//! All errors use the `OS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Validation errors (rejected before any side effect)
//! - 2xx: Wallet / ledger errors
//! - 3xx: Inventory errors
//! - 4xx: Settlement / idempotency errors
//! - 9xx: General / internal errors
//!
//! `InsufficientFunds` and `InsufficientStock` are expected business
//! outcomes, returned as typed results — never exceptions-for-control-flow.
//! Only `ConcurrencyConflict` is safe to retry.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{OrderId, OrderStatus, ProductId};

/// Central error enum for all OpenSettle operations.
#[derive(Debug, Error)]
pub enum SettleError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// The order request failed validation (empty lines, bad values, etc.).
    #[error("OS_ERR_100: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// The requested product does not exist (or is not tracked).
    #[error("OS_ERR_101: Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The product exists but is not currently purchasable.
    #[error("OS_ERR_102: Product not active: {0}")]
    ProductInactive(ProductId),

    /// A line item's product does not belong to the named seller.
    #[error("OS_ERR_103: Product {product_id} is not listed by the named seller")]
    SellerMismatch { product_id: ProductId },

    /// Buyer and seller are the same account.
    #[error("OS_ERR_104: Self-purchase blocked: buyer and seller are the same account")]
    SelfPurchaseBlocked,

    // =================================================================
    // Wallet / Ledger Errors (2xx)
    // =================================================================
    /// Not enough balance to cover the debit.
    #[error("OS_ERR_200: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    /// A monetary amount or quantity that must be positive was not.
    #[error("OS_ERR_201: Invalid amount: {amount}")]
    InvalidAmount { amount: Decimal },

    /// A wallet balance disagrees with its ledger — critical safety alert.
    #[error("OS_ERR_202: Ledger invariant violation: {reason}")]
    LedgerInvariantViolation { reason: String },

    // =================================================================
    // Inventory Errors (3xx)
    // =================================================================
    /// Not enough stock to cover the reservation.
    #[error("OS_ERR_300: Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    // =================================================================
    // Settlement / Idempotency Errors (4xx)
    // =================================================================
    /// Another settlement holds a contended resource (e.g. the same
    /// idempotency key is in flight). Safe to retry the whole request.
    #[error("OS_ERR_400: Concurrency conflict: {reason}")]
    ConcurrencyConflict { reason: String },

    /// The requested order was not found.
    #[error("OS_ERR_401: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// An order status transition that the lifecycle forbids.
    #[error("OS_ERR_402: Invalid order transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("OS_ERR_900: Internal error: {0}")]
    Internal(String),

    /// A backing store could not be reached or its lock was poisoned.
    #[error("OS_ERR_901: Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Configuration error (invalid fee rate, zero retry budget, etc.).
    #[error("OS_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl SettleError {
    /// Whether retrying the whole settlement may succeed. Only lock or
    /// key contention qualifies; every other error is terminal for the
    /// request.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SettleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = SettleError::ProductNotFound(ProductId::new());
        let msg = format!("{err}");
        assert!(msg.starts_with("OS_ERR_101"), "Got: {msg}");
    }

    #[test]
    fn insufficient_funds_display() {
        let err = SettleError::InsufficientFunds {
            needed: Decimal::new(500, 0),
            available: Decimal::new(100, 0),
        };
        let msg = format!("{err}");
        assert!(msg.contains("OS_ERR_200"));
        assert!(msg.contains("500"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn only_concurrency_conflict_is_retryable() {
        assert!(
            SettleError::ConcurrencyConflict {
                reason: "in flight".into()
            }
            .is_retryable()
        );
        assert!(!SettleError::SelfPurchaseBlocked.is_retryable());
        assert!(
            !SettleError::InsufficientFunds {
                needed: Decimal::ONE,
                available: Decimal::ZERO,
            }
            .is_retryable()
        );
        assert!(!SettleError::StoreUnavailable("down".into()).is_retryable());
    }

    #[test]
    fn all_errors_have_os_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(SettleError::SelfPurchaseBlocked),
            Box::new(SettleError::InvalidOrder {
                reason: "empty".into(),
            }),
            Box::new(SettleError::InsufficientStock {
                product_id: ProductId::new(),
                requested: 2,
                available: 1,
            }),
            Box::new(SettleError::Internal("test".into())),
            Box::new(SettleError::InvalidTransition {
                from: OrderStatus::Paid,
                to: OrderStatus::Pending,
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("OS_ERR_"),
                "Error missing OS_ERR_ prefix: {msg}"
            );
        }
    }
}

//! Configuration types for the OpenSettle engine.
//!
//! The fee rate is configuration, not a literal embedded in settlement
//! logic: each marketplace vertical carries its own rate, and a zero
//! rate is a valid, explicit choice (the vendor-order default).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants;

/// Which marketplace vertical an order originates from. Determines the
/// applicable fee rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketplaceKind {
    /// Generic item marketplace (secondhand goods, peer-to-peer sales).
    General,
    /// Business-vendor orders (multi-item orders against a vendor).
    Vendor,
}

impl std::fmt::Display for MarketplaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::General => write!(f, "GENERAL"),
            Self::Vendor => write!(f, "VENDOR"),
        }
    }
}

/// Per-marketplace fee rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Rate for the general marketplace (default 2%).
    pub general_rate: Decimal,
    /// Rate for business-vendor orders (default 0%).
    pub vendor_rate: Decimal,
}

impl FeeSchedule {
    /// The configured rate for the given marketplace.
    #[must_use]
    pub fn rate_for(&self, kind: MarketplaceKind) -> Decimal {
        match kind {
            MarketplaceKind::General => self.general_rate,
            MarketplaceKind::Vendor => self.vendor_rate,
        }
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            general_rate: constants::default_general_fee_rate(),
            vendor_rate: Decimal::ZERO,
        }
    }
}

/// Bounded retry policy for `ConcurrencyConflict` errors. Backoff is
/// exponential: `base_backoff_ms`, doubled per attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first (must be >= 1).
    pub max_attempts: u32,
    /// Backoff before the first retry, in milliseconds.
    pub base_backoff_ms: u64,
}

impl RetryConfig {
    /// Backoff duration before the retry following `attempt`
    /// (zero-based).
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> std::time::Duration {
        let millis = self
            .base_backoff_ms
            .saturating_mul(1u64 << attempt.min(16));
        std::time::Duration::from_millis(millis)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: constants::DEFAULT_MAX_RETRY_ATTEMPTS,
            base_backoff_ms: constants::DEFAULT_BASE_BACKOFF_MS,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub fees: FeeSchedule,
    pub retry: RetryConfig,
    /// Number of `(buyer, idempotency key)` receipts to retain.
    pub idempotency_cache_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::default(),
            retry: RetryConfig::default(),
            idempotency_cache_size: constants::DEFAULT_IDEMPOTENCY_CACHE_SIZE,
        }
    }
}

//! System-wide constants for the OpenSettle engine.

use rust_decimal::Decimal;

/// Decimal places for monetary amounts. Fee rounding happens once, at
/// this scale, on the order total.
pub const MONEY_SCALE: u32 = 2;

/// Default platform fee rate for the general marketplace (2%).
#[must_use]
pub fn default_general_fee_rate() -> Decimal {
    Decimal::new(2, 2)
}

/// Default idempotency cache size (number of `(buyer, key)` receipts
/// to remember).
pub const DEFAULT_IDEMPOTENCY_CACHE_SIZE: usize = 500_000;

/// Default total attempts for a settlement hitting `ConcurrencyConflict`.
pub const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 3;

/// Default backoff before the first retry, in milliseconds.
pub const DEFAULT_BASE_BACKOFF_MS: u64 = 25;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OpenSettle";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_fee_rate_is_two_percent() {
        assert_eq!(default_general_fee_rate(), Decimal::new(2, 2));
        assert_eq!(default_general_fee_rate().to_string(), "0.02");
    }
}

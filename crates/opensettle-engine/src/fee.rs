//! Fee policy — the one place platform fee math lives.
//!
//! `fee = round(gross × rate, 2 dp)`, `net = gross − fee`, so
//! `fee + net == gross` holds exactly by construction. Rounding is
//! applied once, on the order total, never per line item — per-line
//! rounding accumulates drift across multi-item orders.

use opensettle_types::{constants, FeeSchedule, MarketplaceKind, Result, SettleError};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// The split of a gross sale amount into platform fee and seller net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub gross: Decimal,
    pub fee: Decimal,
    pub net: Decimal,
}

/// Pure, deterministic fee computation at a fixed rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    rate: Decimal,
}

impl FeePolicy {
    /// A policy at the given rate.
    ///
    /// # Errors
    /// Returns `Configuration` unless `0 <= rate <= 1`.
    pub fn new(rate: Decimal) -> Result<Self> {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(SettleError::Configuration(format!(
                "fee rate {rate} outside [0, 1]"
            )));
        }
        Ok(Self { rate })
    }

    /// The zero-fee policy.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            rate: Decimal::ZERO,
        }
    }

    /// The configured policy for a marketplace vertical.
    ///
    /// # Errors
    /// Returns `Configuration` if the schedule carries an invalid rate.
    pub fn for_marketplace(schedule: &FeeSchedule, kind: MarketplaceKind) -> Result<Self> {
        Self::new(schedule.rate_for(kind))
    }

    #[must_use]
    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// Split `gross` into fee and net. The fee is rounded to
    /// [`constants::MONEY_SCALE`] decimal places, midpoint away from
    /// zero; the net is the exact remainder.
    #[must_use]
    pub fn compute(&self, gross: Decimal) -> FeeBreakdown {
        let fee = (gross * self.rate)
            .round_dp_with_strategy(constants::MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        FeeBreakdown {
            gross,
            fee,
            net: gross - fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn two_percent_of_500() {
        let policy = FeePolicy::new(Decimal::new(2, 2)).unwrap();
        let split = policy.compute(Decimal::new(500, 0));
        assert_eq!(split.fee, Decimal::new(10, 0));
        assert_eq!(split.net, Decimal::new(490, 0));
    }

    #[test]
    fn zero_rate_takes_nothing() {
        let split = FeePolicy::zero().compute(Decimal::new(12345, 2));
        assert_eq!(split.fee, Decimal::ZERO);
        assert_eq!(split.net, Decimal::new(12345, 2));
    }

    #[test]
    fn fee_rounds_at_money_scale() {
        // 2% of 0.25 = 0.005 → rounds away from zero to 0.01
        let policy = FeePolicy::new(Decimal::new(2, 2)).unwrap();
        let split = policy.compute(Decimal::new(25, 2));
        assert_eq!(split.fee, Decimal::new(1, 2));
        assert_eq!(split.net, Decimal::new(24, 2));
    }

    #[test]
    fn schedule_lookup() {
        let schedule = FeeSchedule::default();
        let general = FeePolicy::for_marketplace(&schedule, MarketplaceKind::General).unwrap();
        let vendor = FeePolicy::for_marketplace(&schedule, MarketplaceKind::Vendor).unwrap();
        assert_eq!(general.rate(), Decimal::new(2, 2));
        assert_eq!(vendor.rate(), Decimal::ZERO);
    }

    #[test]
    fn out_of_range_rate_rejected() {
        assert!(FeePolicy::new(Decimal::new(-1, 2)).is_err());
        assert!(FeePolicy::new(Decimal::new(101, 2)).is_err());
        assert!(FeePolicy::new(Decimal::ONE).is_ok());
    }

    proptest! {
        /// Property: the split is exact — `fee + net == gross` — for any
        /// amount and any rate up to 10%.
        #[test]
        fn prop_fee_split_exact(
            cents in 1u64..1_000_000_00u64,
            rate_bp in 0u32..1000,
        ) {
            let gross = Decimal::new(i64::try_from(cents).unwrap(), 2);
            let policy = FeePolicy::new(Decimal::new(i64::from(rate_bp), 4)).unwrap();
            let split = policy.compute(gross);
            prop_assert_eq!(split.fee + split.net, gross);
            prop_assert!(split.fee >= Decimal::ZERO);
            prop_assert!(split.net <= gross);
        }

        /// Property: rounding once on the total never differs from the
        /// breakdown's own arithmetic — i.e. the fee is a function of the
        /// total alone, independent of how lines compose it.
        #[test]
        fn prop_fee_depends_only_on_total(
            line_cents in prop::collection::vec(1u64..100_000u64, 1..10),
        ) {
            let total: Decimal = line_cents
                .iter()
                .map(|&c| Decimal::new(i64::try_from(c).unwrap(), 2))
                .sum();
            let policy = FeePolicy::new(Decimal::new(2, 2)).unwrap();
            let whole = policy.compute(total);
            prop_assert_eq!(whole.gross, total);
            prop_assert_eq!(whole.fee + whole.net, total);
            // Recomputing from the same total is deterministic.
            prop_assert_eq!(policy.compute(total), whole);
        }
    }
}

//! Property-based tests for store invariants.
//!
//! These use proptest to verify the two invariants the engine leans on:
//! - Balance: `balance == Σcredits − Σdebits` over completed entries,
//!   for any sequence of wallet operations
//! - Stock: tracked stock never underflows and is conserved across any
//!   interleaving of reservations and releases

use opensettle_stores::{InventoryService, WalletService};
use opensettle_types::{ProductId, ReferenceId, SettleError, UserId, WalletId};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for positive amounts in cents.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1u64..1_000_000_00u64).prop_map(|cents| Decimal::new(i64::try_from(cents).unwrap(), 2))
}

#[derive(Debug, Clone)]
enum WalletOp {
    Credit(Decimal),
    Debit(Decimal),
}

fn wallet_op_strategy() -> impl Strategy<Value = WalletOp> {
    prop_oneof![
        amount_strategy().prop_map(WalletOp::Credit),
        amount_strategy().prop_map(WalletOp::Debit),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: after any sequence of credits and debits (some of which
    /// fail on insufficient funds), the balance equals the signed ledger
    /// sum and never goes negative.
    #[test]
    fn prop_balance_matches_ledger(ops in prop::collection::vec(wallet_op_strategy(), 1..40)) {
        let service = WalletService::new();
        let wallet = WalletId::for_owner(UserId::new());
        let counterparty = WalletId::for_owner(UserId::new());

        for op in ops {
            match op {
                WalletOp::Credit(amount) => {
                    service
                        .credit(wallet, amount, ReferenceId::new(), counterparty, "credit")
                        .unwrap();
                }
                WalletOp::Debit(amount) => {
                    // A failed debit must leave no trace; a successful one
                    // must append its entry. Either way the invariant holds.
                    let _ = service.debit(
                        wallet,
                        amount,
                        ReferenceId::new(),
                        counterparty,
                        "debit",
                    );
                }
            }
            service.verify_wallet(wallet).unwrap();
        }

        let balance = service.balance(wallet).unwrap();
        prop_assert!(balance >= Decimal::ZERO, "balance went negative: {balance}");
        let signed_sum: Decimal = service
            .entries(wallet)
            .unwrap()
            .iter()
            .map(opensettle_types::LedgerEntry::signed_amount)
            .sum();
        prop_assert_eq!(balance, signed_sum);
    }

    /// Property: stock is conserved — initial == final + outstanding
    /// reservations — under any sequence of reserves and releases, and a
    /// reserve never succeeds beyond the available counter.
    #[test]
    fn prop_stock_conserved(
        initial in 0u32..50,
        requests in prop::collection::vec((1u32..8, any::<bool>()), 1..30),
    ) {
        let service = InventoryService::new();
        let product = ProductId::new();
        service.register(product, Some(initial)).unwrap();

        let mut outstanding: Vec<opensettle_stores::ReservationToken> = Vec::new();
        for (quantity, release_after) in requests {
            match service.reserve(product, quantity) {
                Ok(token) => {
                    if release_after {
                        service.release(&token).unwrap();
                    } else {
                        outstanding.push(token);
                    }
                }
                Err(SettleError::InsufficientStock { requested, available, .. }) => {
                    prop_assert!(requested > available);
                }
                Err(other) => return Err(TestCaseError::fail(format!("unexpected: {other}"))),
            }
        }

        let held: u32 = outstanding.iter().map(|t| t.quantity).sum();
        let remaining = service.stock(product).unwrap().unwrap();
        prop_assert_eq!(remaining + held, initial);
    }

    /// Property: for an unlimited product, reservation always succeeds
    /// and the counter stays `None`.
    #[test]
    fn prop_unlimited_stock_always_reserves(quantities in prop::collection::vec(1u32..1000, 1..20)) {
        let service = InventoryService::new();
        let product = ProductId::new();
        service.register(product, None).unwrap();

        for quantity in quantities {
            let token = service.reserve(product, quantity).unwrap();
            prop_assert!(!token.tracked);
        }
        prop_assert_eq!(service.stock(product).unwrap(), None);
    }
}

/// Concurrency: N threads race for a small pool of stock; successful
/// reservations never exceed the pool and the counter never underflows.
#[test]
fn concurrent_reservations_never_oversell() {
    use std::sync::Arc;

    let service = Arc::new(InventoryService::new());
    let product = ProductId::new();
    service.register(product, Some(10)).unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || service.reserve(product, 1).is_ok())
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join())
        .filter(|r| matches!(r, Ok(true)))
        .count();

    assert_eq!(successes, 10, "exactly the pool size must win");
    assert_eq!(service.stock(product).unwrap(), Some(0));
}

//! Append-only ledger store.
//!
//! The ledger is the source of truth for wallet balances: a wallet's
//! balance equals the signed sum of its completed entries. Entries are
//! never mutated or deleted — corrections are new compensating entries.
//! The store's schema is part of the engine's contract, not optional.
//!
//! `LedgerStore` is not internally synchronized; it is owned by
//! [`crate::WalletService`], whose lock guards balance and ledger as one
//! unit.

use std::collections::HashMap;

use opensettle_types::{LedgerEntry, ReferenceId, WalletId};
use rust_decimal::Decimal;

/// Durable, append-only record of monetary movements per wallet.
#[derive(Debug, Default)]
pub struct LedgerStore {
    /// All entries in append order.
    entries: Vec<LedgerEntry>,
    /// Index positions per wallet.
    by_wallet: HashMap<WalletId, Vec<usize>>,
    /// Index positions per settlement reference.
    by_reference: HashMap<ReferenceId, Vec<usize>>,
}

impl LedgerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. This is the only write operation the store has.
    pub fn append(&mut self, entry: LedgerEntry) {
        let index = self.entries.len();
        self.by_wallet
            .entry(entry.wallet_id)
            .or_default()
            .push(index);
        self.by_reference
            .entry(entry.reference_id)
            .or_default()
            .push(index);
        self.entries.push(entry);
    }

    /// All entries for a wallet, in append order.
    #[must_use]
    pub fn entries_for_wallet(&self, wallet_id: WalletId) -> Vec<LedgerEntry> {
        self.by_wallet
            .get(&wallet_id)
            .map(|indexes| indexes.iter().map(|&i| self.entries[i].clone()).collect())
            .unwrap_or_default()
    }

    /// The paired entries of one settlement, in append order.
    #[must_use]
    pub fn entries_for_reference(&self, reference_id: ReferenceId) -> Vec<LedgerEntry> {
        self.by_reference
            .get(&reference_id)
            .map(|indexes| indexes.iter().map(|&i| self.entries[i].clone()).collect())
            .unwrap_or_default()
    }

    /// Σcredits − Σdebits over a wallet's completed entries.
    #[must_use]
    pub fn signed_sum(&self, wallet_id: WalletId) -> Decimal {
        self.by_wallet
            .get(&wallet_id)
            .map(|indexes| {
                indexes
                    .iter()
                    .map(|&i| self.entries[i].signed_amount())
                    .sum()
            })
            .unwrap_or(Decimal::ZERO)
    }

    /// All wallets that have at least one entry.
    #[must_use]
    pub fn wallets(&self) -> Vec<WalletId> {
        self.by_wallet.keys().copied().collect()
    }

    /// Total number of entries ever appended.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

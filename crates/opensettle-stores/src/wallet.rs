//! Wallet service — owns balance reads/writes and wraps the ledger store.
//!
//! A wallet is created lazily with a zero balance on first access; it is
//! never deleted while ledger entries reference it. Every mutation
//! updates the balance and appends the matching ledger entry inside one
//! critical section, so `balance == Σcredits − Σdebits` holds at every
//! observable point.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use opensettle_types::{
    Direction, LedgerEntry, ReferenceId, Result, SettleError, WalletId,
};
use rust_decimal::Decimal;

use crate::ledger_store::LedgerStore;

#[derive(Debug, Default)]
struct WalletInner {
    balances: HashMap<WalletId, Decimal>,
    ledger: LedgerStore,
}

/// Owns wallet balances; the only writer of the ledger store.
#[derive(Debug, Default)]
pub struct WalletService {
    inner: Mutex<WalletInner>,
}

impl WalletService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, WalletInner>> {
        self.inner
            .lock()
            .map_err(|_| SettleError::StoreUnavailable("wallet store lock poisoned".into()))
    }

    /// Current balance. Creates a zero-balance wallet on first access —
    /// a missing wallet is never an error.
    pub fn balance(&self, wallet_id: WalletId) -> Result<Decimal> {
        let mut inner = self.lock()?;
        Ok(*inner.balances.entry(wallet_id).or_insert(Decimal::ZERO))
    }

    /// Debit a wallet and append the matching completed ledger entry.
    ///
    /// Runs inside one critical section: the balance check, the
    /// decrement, and the ledger append are a single atomic unit.
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount <= 0`
    /// - `InsufficientFunds` if the balance cannot cover the debit
    pub fn debit(
        &self,
        wallet_id: WalletId,
        amount: Decimal,
        reference_id: ReferenceId,
        counterparty_id: WalletId,
        memo: &str,
    ) -> Result<LedgerEntry> {
        if amount <= Decimal::ZERO {
            return Err(SettleError::InvalidAmount { amount });
        }
        let mut inner = self.lock()?;
        let balance = inner.balances.entry(wallet_id).or_insert(Decimal::ZERO);
        if *balance < amount {
            return Err(SettleError::InsufficientFunds {
                needed: amount,
                available: *balance,
            });
        }
        *balance -= amount;

        let entry = LedgerEntry::completed(
            wallet_id,
            Direction::Debit,
            amount,
            reference_id,
            counterparty_id,
            memo,
        );
        inner.ledger.append(entry.clone());
        tracing::debug!(
            wallet = %wallet_id,
            amount = %amount,
            reference = %reference_id,
            "Wallet debited"
        );
        Ok(entry)
    }

    /// Credit a wallet unconditionally and append the matching completed
    /// ledger entry. Creates the wallet on first credit.
    ///
    /// # Errors
    /// Returns `InvalidAmount` if `amount <= 0`.
    pub fn credit(
        &self,
        wallet_id: WalletId,
        amount: Decimal,
        reference_id: ReferenceId,
        counterparty_id: WalletId,
        memo: &str,
    ) -> Result<LedgerEntry> {
        if amount <= Decimal::ZERO {
            return Err(SettleError::InvalidAmount { amount });
        }
        let mut inner = self.lock()?;
        *inner.balances.entry(wallet_id).or_insert(Decimal::ZERO) += amount;

        let entry = LedgerEntry::completed(
            wallet_id,
            Direction::Credit,
            amount,
            reference_id,
            counterparty_id,
            memo,
        );
        inner.ledger.append(entry.clone());
        tracing::debug!(
            wallet = %wallet_id,
            amount = %amount,
            reference = %reference_id,
            "Wallet credited"
        );
        Ok(entry)
    }

    /// All ledger entries for a wallet, in append order.
    pub fn entries(&self, wallet_id: WalletId) -> Result<Vec<LedgerEntry>> {
        Ok(self.lock()?.ledger.entries_for_wallet(wallet_id))
    }

    /// The paired entries of one settlement.
    pub fn entries_for_reference(&self, reference_id: ReferenceId) -> Result<Vec<LedgerEntry>> {
        Ok(self.lock()?.ledger.entries_for_reference(reference_id))
    }

    /// Total number of ledger entries ever written.
    pub fn ledger_len(&self) -> Result<usize> {
        Ok(self.lock()?.ledger.len())
    }

    /// Verify `balance == Σcredits − Σdebits` for one wallet.
    ///
    /// # Errors
    /// Returns [`SettleError::LedgerInvariantViolation`] on mismatch.
    pub fn verify_wallet(&self, wallet_id: WalletId) -> Result<()> {
        let inner = self.lock()?;
        Self::check_wallet(&inner, wallet_id)
    }

    /// Verify the balance invariant for every wallet the ledger has seen.
    pub fn verify_all(&self) -> Result<()> {
        let inner = self.lock()?;
        for wallet_id in inner.ledger.wallets() {
            Self::check_wallet(&inner, wallet_id)?;
        }
        Ok(())
    }

    fn check_wallet(inner: &WalletInner, wallet_id: WalletId) -> Result<()> {
        let balance = inner
            .balances
            .get(&wallet_id)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let ledger_sum = inner.ledger.signed_sum(wallet_id);
        if balance != ledger_sum {
            return Err(SettleError::LedgerInvariantViolation {
                reason: format!(
                    "{wallet_id}: balance {balance} != ledger sum {ledger_sum}"
                ),
            });
        }
        Ok(())
    }
}

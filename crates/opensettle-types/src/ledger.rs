//! Ledger entry types — the immutable record of monetary movement.
//!
//! Every settlement writes exactly two completed entries (a buyer debit
//! and a seller credit) sharing one [`ReferenceId`]. Entries are never
//! mutated or deleted once completed; corrections are new compensating
//! entries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{EntryId, ReferenceId, WalletId};

/// Whether an entry moves money out of or into a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Debit,
    Credit,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debit => write!(f, "DEBIT"),
            Self::Credit => write!(f, "CREDIT"),
        }
    }
}

/// Lifecycle status of a ledger entry.
///
/// Only `Completed` entries count toward a wallet's balance. The engine
/// writes entries as `Completed` at commit time; `Pending` exists for
/// stores that stage entries before their transaction scope commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryStatus {
    Pending,
    Completed,
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// One immutable debit or credit record against a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Globally unique entry identifier.
    pub id: EntryId,
    /// The wallet this entry moves money out of or into.
    pub wallet_id: WalletId,
    /// Debit (money out) or credit (money in).
    pub direction: Direction,
    /// Absolute amount moved. Always positive.
    pub amount: Decimal,
    /// Ties this entry to its paired counterpart from the same settlement.
    pub reference_id: ReferenceId,
    /// The wallet on the other side of the movement.
    pub counterparty_id: WalletId,
    /// Human-readable context ("purchase", "seller proceeds", ...).
    pub memo: String,
    /// Lifecycle status; only `Completed` entries count toward balance.
    pub status: EntryStatus,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
    /// Free-form annotations (order id, marketplace, ...).
    pub metadata: HashMap<String, String>,
}

impl LedgerEntry {
    /// Construct a completed entry with a fresh [`EntryId`] and timestamp.
    #[must_use]
    pub fn completed(
        wallet_id: WalletId,
        direction: Direction,
        amount: Decimal,
        reference_id: ReferenceId,
        counterparty_id: WalletId,
        memo: impl Into<String>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            wallet_id,
            direction,
            amount,
            reference_id,
            counterparty_id,
            memo: memo.into(),
            status: EntryStatus::Completed,
            created_at: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// The entry's contribution to its wallet's balance: credits are
    /// positive, debits negative. Pending entries contribute nothing.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        if self.status != EntryStatus::Completed {
            return Decimal::ZERO;
        }
        match self.direction {
            Direction::Credit => self.amount,
            Direction::Debit => -self.amount,
        }
    }
}

//! Audit event types for the post-commit compliance trail.
//!
//! The engine emits one [`AuditEvent`] per committed settlement,
//! best-effort: a sink failure is logged locally and never propagated
//! back to the settlement caller.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ReferenceId, UserId};

/// The action an audit event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    /// A settlement committed: funds moved, stock decremented, order paid.
    OrderSettled,
    /// A paid order was confirmed delivered.
    OrderDelivered,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrderSettled => write!(f, "ORDER_SETTLED"),
            Self::OrderDelivered => write!(f, "ORDER_DELIVERED"),
        }
    }
}

/// A post-commit compliance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// The account that initiated the action (the buyer, for settlements).
    pub actor: UserId,
    pub action: AuditAction,
    /// Gross amount moved.
    pub amount: Decimal,
    /// The settlement's reference id, tying the event to its ledger pair.
    pub reference_id: ReferenceId,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    #[must_use]
    pub fn now(actor: UserId, action: AuditAction, amount: Decimal, reference_id: ReferenceId) -> Self {
        Self {
            actor,
            action,
            amount,
            reference_id,
            timestamp: Utc::now(),
        }
    }
}

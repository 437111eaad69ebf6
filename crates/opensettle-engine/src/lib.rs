//! # opensettle-engine
//!
//! **Settlement plane**: order validation, stock reservation, fund
//! transfer, ledger emission, and idempotent retry handling.
//!
//! ## Architecture
//!
//! The [`SettlementCoordinator`] orchestrates one purchase or
//! order-placement request end to end:
//! 1. Validates the request against the catalog (no side effects)
//! 2. Reserves stock per line through the inventory service
//! 3. Debits the buyer for the gross total
//! 4. Credits the seller net of the platform fee
//! 5. Records the paired ledger entries, marks the order paid, and
//!    emits an audit event best-effort
//!
//! Any failure after reservation begins is fully compensated: stock is
//! released and no ledger entry from the attempt survives. A retry
//! carrying the same idempotency key replays the original receipt
//! instead of charging twice.

pub mod audit;
pub mod coordinator;
pub mod fee;
pub mod idempotency;

pub use audit::{AuditSink, LogAuditSink, NullAuditSink};
pub use coordinator::{LineRequest, OrderRequest, SettlementCoordinator, SettlementReceipt};
pub use fee::{FeeBreakdown, FeePolicy};
pub use idempotency::{BeginOutcome, IdempotencyCache};

//! # opensettle-types
//!
//! Shared types, errors, and configuration for the **OpenSettle**
//! settlement engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`UserId`], [`WalletId`], [`ProductId`], [`OrderId`], [`EntryId`], [`ReferenceId`], [`IdempotencyKey`]
//! - **Ledger model**: [`LedgerEntry`], [`Direction`], [`EntryStatus`]
//! - **Order model**: [`Order`], [`OrderLine`], [`OrderStatus`]
//! - **Settlement flow**: [`SettlementPhase`]
//! - **Catalog model**: [`ProductSnapshot`]
//! - **Audit model**: [`AuditEvent`], [`AuditAction`]
//! - **Configuration**: [`EngineConfig`], [`FeeSchedule`], [`RetryConfig`], [`MarketplaceKind`]
//! - **Errors**: [`SettleError`] with `OS_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod audit;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod order;
pub mod phase;
pub mod product;

// Re-export all primary types at crate root for ergonomic imports:
//   use opensettle_types::{Order, LedgerEntry, SettleError, ...};

pub use audit::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use ledger::*;
pub use order::*;
pub use phase::*;
pub use product::*;

// Constants are accessed via `opensettle_types::constants::FOO`
// (not re-exported to avoid name collisions).

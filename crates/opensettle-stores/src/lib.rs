//! # opensettle-stores
//!
//! **State plane**: the mutable shared state of the settlement engine and
//! the services that own it.
//!
//! ## Architecture
//!
//! Wallet balance and product stock are the engine's two mutable shared
//! resources. Both are mutated exclusively through their owning service,
//! never by direct store writes elsewhere:
//!
//! 1. **LedgerStore**: append-only record of monetary movements — the
//!    source of truth for balance. No update or delete API exists.
//! 2. **WalletService**: owns balances and wraps the ledger store;
//!    enforces the non-negative balance invariant.
//! 3. **InventoryService**: owns per-product stock counters; reservation
//!    is an atomic check-and-decrement, release is its compensation.
//! 4. **CatalogReader**: read-only seam to the listing subsystems that
//!    own product data.
//!
//! Every public operation is a single critical section on its owning
//! service, so concurrent settlements against the same wallet or product
//! serialize at the store and no operation suspends while holding a lock
//! another settlement needs.

pub mod catalog;
pub mod inventory;
pub mod ledger_store;
pub mod wallet;

pub use catalog::{CatalogReader, StaticCatalog};
pub use inventory::{InventoryService, ReservationToken};
pub use ledger_store::LedgerStore;
pub use wallet::WalletService;

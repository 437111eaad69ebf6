//! Minimal end-to-end walkthrough: list a product, fund a buyer, settle
//! a purchase, confirm delivery.
//!
//! Run with structured logs:
//! ```sh
//! RUST_LOG=debug cargo run --example quickstart
//! ```

use std::sync::Arc;

use opensettle_engine::{NullAuditSink, SettlementCoordinator};
use opensettle_stores::{CatalogReader, InventoryService, StaticCatalog, WalletService};
use opensettle_types::{
    EngineConfig, IdempotencyKey, ProductSnapshot, ReferenceId, Result, UserId, WalletId,
};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let wallets = Arc::new(WalletService::new());
    let inventory = Arc::new(InventoryService::new());
    let catalog = Arc::new(StaticCatalog::new());
    let coordinator = SettlementCoordinator::new(
        Arc::clone(&wallets),
        Arc::clone(&inventory),
        Arc::clone(&catalog) as Arc<dyn CatalogReader>,
        Arc::new(NullAuditSink),
        EngineConfig::default(),
    );

    let buyer = UserId::new();
    let seller = UserId::new();

    // List a used textbook at 500 with 3 in stock.
    let listing = ProductSnapshot {
        id: opensettle_types::ProductId::new(),
        owner_id: seller,
        price: Decimal::new(500, 0),
        stock_quantity: Some(3),
        is_active: true,
    };
    let product = listing.id;
    catalog.insert(listing);
    inventory.register(product, Some(3))?;

    // Give the buyer a starting balance.
    wallets.credit(
        WalletId::for_owner(buyer),
        Decimal::new(1000, 0),
        ReferenceId::new(),
        WalletId::for_owner(seller),
        "initial deposit",
    )?;

    let receipt = coordinator.purchase_item(buyer, product, IdempotencyKey::new("demo-1"))?;
    println!(
        "settled order {}: gross {} / fee {} / seller nets {}",
        receipt.order.id, receipt.fees.gross, receipt.fees.fee, receipt.fees.net
    );

    let delivered = coordinator.mark_delivered(receipt.order.id)?;
    println!("order {} is now {}", delivered.id, delivered.status);

    println!(
        "buyer balance: {}, seller balance: {}, stock left: {:?}",
        wallets.balance(WalletId::for_owner(buyer))?,
        wallets.balance(WalletId::for_owner(seller))?,
        inventory.stock(product)?,
    );
    wallets.verify_all()?;
    Ok(())
}

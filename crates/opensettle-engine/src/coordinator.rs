//! Settlement Coordinator — the single entry point for purchases.
//!
//! A settlement is a four-phase flow:
//! 1. **Validating** — catalog checks only, no side effects. A rejection
//!    here leaves no trace beyond the log line.
//! 2. **Reserving** — per-line atomic stock decrements. A failure on line
//!    N releases the holds taken for lines 1..N.
//! 3. **Transferring** — one debit of the buyer for the gross total. An
//!    insufficient-funds failure releases every hold.
//! 4. **Committing** — the seller credit, the Pending → Paid transition,
//!    and the idempotency receipt, then a best-effort audit event.
//!
//! All-or-nothing: a failure at any phase compensates every earlier side
//! effect, so no order ever half-settles. The coordinator holds at most
//! one store lock at a time; cross-store atomicity comes from the
//! compensation path, not from lock nesting.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use opensettle_stores::{CatalogReader, InventoryService, ReservationToken, WalletService};
use opensettle_types::{
    AuditAction, AuditEvent, EngineConfig, EntryId, IdempotencyKey, MarketplaceKind, Order,
    OrderId, OrderLine, OrderStatus, ProductId, ReferenceId, Result, SettleError,
    SettlementPhase, UserId, WalletId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::audit::AuditSink;
use crate::fee::{FeeBreakdown, FeePolicy};
use crate::idempotency::{BeginOutcome, IdempotencyCache};

/// One requested line of an order: what and how many. Prices come from
/// the catalog at validation time, never from the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A client request to settle an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub marketplace: MarketplaceKind,
    pub lines: Vec<LineRequest>,
    pub idempotency_key: IdempotencyKey,
}

/// Proof of a committed settlement, returned to the caller and replayed
/// verbatim on an idempotent retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub order: Order,
    /// Ties the receipt to its debit/credit ledger pair.
    pub reference_id: ReferenceId,
    pub debit_entry: EntryId,
    pub credit_entry: EntryId,
    pub fees: FeeBreakdown,
    pub settled_at: DateTime<Utc>,
}

/// An order the coordinator has recorded, with the reference that links
/// it to the ledger.
#[derive(Debug, Clone)]
struct OrderRecord {
    order: Order,
    reference_id: ReferenceId,
}

/// Orchestrates validation, reservation, transfer, and commit for every
/// purchase. Thread-safe; share via `Arc`.
pub struct SettlementCoordinator {
    wallets: Arc<WalletService>,
    inventory: Arc<InventoryService>,
    catalog: Arc<dyn CatalogReader>,
    audit: Arc<dyn AuditSink>,
    config: EngineConfig,
    idempotency: IdempotencyCache,
    orders: Mutex<HashMap<OrderId, OrderRecord>>,
}

impl SettlementCoordinator {
    #[must_use]
    pub fn new(
        wallets: Arc<WalletService>,
        inventory: Arc<InventoryService>,
        catalog: Arc<dyn CatalogReader>,
        audit: Arc<dyn AuditSink>,
        config: EngineConfig,
    ) -> Self {
        let idempotency = IdempotencyCache::new(config.idempotency_cache_size);
        Self {
            wallets,
            inventory,
            catalog,
            audit,
            config,
            idempotency,
            orders: Mutex::new(HashMap::new()),
        }
    }

    /// The idempotency cache, exposed for diagnostics and tests.
    #[must_use]
    pub fn idempotency(&self) -> &IdempotencyCache {
        &self.idempotency
    }

    /// Settle an order end to end, retrying transient conflicts.
    ///
    /// Only [`SettleError::ConcurrencyConflict`] is retried, with bounded
    /// exponential backoff from the retry config. Every other error is
    /// terminal for the request.
    ///
    /// # Errors
    /// See the error taxonomy on [`SettleError`]; business rejections
    /// (`InsufficientFunds`, `InsufficientStock`, validation failures)
    /// leave all balances and stock exactly as they were.
    pub fn place_order(&self, request: &OrderRequest) -> Result<SettlementReceipt> {
        let mut attempt = 0u32;
        loop {
            match self.settle_once(request) {
                Err(err) if err.is_retryable() && attempt + 1 < self.config.retry.max_attempts => {
                    let backoff = self.config.retry.backoff_for(attempt);
                    tracing::warn!(
                        buyer = %request.buyer_id,
                        key = %request.idempotency_key,
                        attempt,
                        backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Retrying settlement after conflict"
                    );
                    std::thread::sleep(backoff);
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    /// Convenience wrapper for the single-item marketplace purchase:
    /// one line, quantity one, seller taken from the listing.
    pub fn purchase_item(
        &self,
        buyer_id: UserId,
        product_id: ProductId,
        idempotency_key: IdempotencyKey,
    ) -> Result<SettlementReceipt> {
        let snapshot = self
            .catalog
            .product(product_id)
            .ok_or(SettleError::ProductNotFound(product_id))?;
        let request = OrderRequest {
            buyer_id,
            seller_id: snapshot.owner_id,
            marketplace: MarketplaceKind::General,
            lines: vec![LineRequest {
                product_id,
                quantity: 1,
            }],
            idempotency_key,
        };
        self.place_order(&request)
    }

    /// A recorded order by id.
    pub fn order(&self, order_id: OrderId) -> Result<Order> {
        let orders = self.lock_orders()?;
        orders
            .get(&order_id)
            .map(|record| record.order.clone())
            .ok_or(SettleError::OrderNotFound(order_id))
    }

    /// Confirm delivery of a paid order. Fulfilment itself happens
    /// outside the engine; this only advances the lifecycle and emits
    /// the audit record.
    ///
    /// # Errors
    /// - `OrderNotFound` for unknown ids
    /// - `InvalidTransition` unless the order is `Paid`
    pub fn mark_delivered(&self, order_id: OrderId) -> Result<Order> {
        let (order, reference_id) = {
            let mut orders = self.lock_orders()?;
            let record = orders
                .get_mut(&order_id)
                .ok_or(SettleError::OrderNotFound(order_id))?;
            record.order.transition_to(OrderStatus::Delivered)?;
            (record.order.clone(), record.reference_id)
        };

        self.emit_audit(AuditEvent::now(
            order.buyer_id,
            AuditAction::OrderDelivered,
            order.total_amount,
            reference_id,
        ));
        tracing::info!(order = %order_id, "Order delivered");
        Ok(order)
    }

    fn lock_orders(&self) -> Result<MutexGuard<'_, HashMap<OrderId, OrderRecord>>> {
        self.orders
            .lock()
            .map_err(|_| SettleError::StoreUnavailable("order store lock poisoned".into()))
    }

    /// One settlement attempt: claim the idempotency key, run the phases,
    /// and either publish the receipt or release the key for retry.
    fn settle_once(&self, request: &OrderRequest) -> Result<SettlementReceipt> {
        match self
            .idempotency
            .begin(request.buyer_id, &request.idempotency_key)?
        {
            BeginOutcome::Replayed(receipt) => {
                tracing::info!(
                    buyer = %request.buyer_id,
                    key = %request.idempotency_key,
                    order = %receipt.order.id,
                    "Replaying settled receipt for duplicate request"
                );
                return Ok(receipt);
            }
            BeginOutcome::InFlight => {
                return Err(SettleError::ConcurrencyConflict {
                    reason: format!(
                        "settlement for {} already in flight",
                        request.idempotency_key
                    ),
                });
            }
            BeginOutcome::Fresh => {}
        }

        match self.run_settlement(request) {
            Ok(receipt) => {
                self.idempotency.complete(
                    request.buyer_id,
                    &request.idempotency_key,
                    receipt.clone(),
                )?;
                self.emit_audit(AuditEvent::now(
                    request.buyer_id,
                    AuditAction::OrderSettled,
                    receipt.fees.gross,
                    receipt.reference_id,
                ));
                tracing::info!(
                    phase = %SettlementPhase::Done,
                    order = %receipt.order.id,
                    buyer = %request.buyer_id,
                    seller = %request.seller_id,
                    gross = %receipt.fees.gross,
                    fee = %receipt.fees.fee,
                    "Settlement committed"
                );
                Ok(receipt)
            }
            Err(err) => {
                // A failed attempt must not pin the key, or the client
                // could never retry it.
                self.idempotency
                    .abandon(request.buyer_id, &request.idempotency_key)?;
                Err(err)
            }
        }
    }

    fn run_settlement(&self, request: &OrderRequest) -> Result<SettlementReceipt> {
        let lines = self.validate(request)?;

        // The fee split is checked before any side effect: the seller
        // credit requires a positive net, so an order whose net rounds
        // to zero (a zero-value order, or a fee rate swallowing the
        // whole gross) is rejected here, not mid-transfer.
        let policy = FeePolicy::for_marketplace(&self.config.fees, request.marketplace)?;
        let gross: Decimal = lines.iter().map(OrderLine::line_total).sum();
        let fees = policy.compute(gross);
        if fees.net <= Decimal::ZERO {
            return Err(SettleError::InvalidOrder {
                reason: format!("seller would net {} on a gross of {gross}", fees.net),
            });
        }

        let reference_id = ReferenceId::new();

        // Reserving: line N failing releases lines 1..N.
        let mut tokens: Vec<ReservationToken> = Vec::with_capacity(lines.len());
        for line in &lines {
            match self.inventory.reserve(line.product_id, line.quantity) {
                Ok(token) => tokens.push(token),
                Err(err) => {
                    self.release_all(&tokens);
                    self.record_failed(request, &lines, reference_id);
                    tracing::info!(
                        phase = %SettlementPhase::RolledBack,
                        buyer = %request.buyer_id,
                        product = %line.product_id,
                        error = %err,
                        "Reservation failed, holds released"
                    );
                    return Err(err);
                }
            }
        }

        // Transferring: a single debit for the gross total.
        let mut order = Order::pending(
            request.buyer_id,
            request.seller_id,
            request.marketplace,
            lines,
        );
        order.fee_amount = fees.fee;

        let buyer_wallet = WalletId::for_owner(request.buyer_id);
        let seller_wallet = WalletId::for_owner(request.seller_id);
        let memo = format!("order {}", order.id);

        let debit = match self.wallets.debit(
            buyer_wallet,
            fees.gross,
            reference_id,
            seller_wallet,
            &memo,
        ) {
            Ok(entry) => entry,
            Err(err) => {
                self.release_all(&tokens);
                self.record_failed(request, &order.lines, reference_id);
                tracing::info!(
                    phase = %SettlementPhase::RolledBack,
                    buyer = %request.buyer_id,
                    order = %order.id,
                    error = %err,
                    "Debit failed, holds released"
                );
                return Err(err);
            }
        };

        // Committing: past this point failures are compensated, never
        // aborted — the buyer gets their money back via a reversal credit.
        let credit = match self.wallets.credit(
            seller_wallet,
            fees.net,
            reference_id,
            buyer_wallet,
            &memo,
        ) {
            Ok(entry) => entry,
            Err(err) => {
                let reversal = self.wallets.credit(
                    buyer_wallet,
                    fees.gross,
                    reference_id,
                    seller_wallet,
                    "reversal",
                );
                if let Err(reversal_err) = reversal {
                    tracing::error!(
                        order = %order.id,
                        error = %reversal_err,
                        "Reversal credit failed after seller credit failure"
                    );
                }
                self.release_all(&tokens);
                self.record_failed(request, &order.lines, reference_id);
                return Err(err);
            }
        };

        order.transition_to(OrderStatus::Paid)?;
        let receipt = SettlementReceipt {
            reference_id,
            debit_entry: debit.id,
            credit_entry: credit.id,
            fees,
            settled_at: Utc::now(),
            order: order.clone(),
        };
        self.lock_orders()?.insert(
            order.id,
            OrderRecord {
                order,
                reference_id,
            },
        );
        Ok(receipt)
    }

    /// Validation phase: catalog reads only, no side effects. Prices are
    /// snapshotted from the catalog here.
    fn validate(&self, request: &OrderRequest) -> Result<Vec<OrderLine>> {
        tracing::debug!(
            phase = %SettlementPhase::Validating,
            buyer = %request.buyer_id,
            seller = %request.seller_id,
            lines = request.lines.len(),
            "Validating order request"
        );
        if request.lines.is_empty() {
            return Err(SettleError::InvalidOrder {
                reason: "order has no lines".into(),
            });
        }
        if request.buyer_id == request.seller_id {
            return Err(SettleError::SelfPurchaseBlocked);
        }

        let mut lines = Vec::with_capacity(request.lines.len());
        for line in &request.lines {
            if line.quantity == 0 {
                return Err(SettleError::InvalidOrder {
                    reason: format!("zero quantity for {}", line.product_id),
                });
            }
            let snapshot = self
                .catalog
                .product(line.product_id)
                .ok_or(SettleError::ProductNotFound(line.product_id))?;
            if !snapshot.is_active {
                return Err(SettleError::ProductInactive(line.product_id));
            }
            if snapshot.owner_id != request.seller_id {
                return Err(SettleError::SellerMismatch {
                    product_id: line.product_id,
                });
            }
            // The listing's stock hint is advisory; the authoritative
            // check is the reservation itself. Rejecting here saves a
            // reservation round for requests the listing already rules out.
            if !snapshot.appears_available(line.quantity) {
                return Err(SettleError::InsufficientStock {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available: snapshot.stock_quantity.unwrap_or(0),
                });
            }
            lines.push(OrderLine::new(
                line.product_id,
                line.quantity,
                snapshot.price,
            ));
        }
        Ok(lines)
    }

    fn release_all(&self, tokens: &[ReservationToken]) {
        for token in tokens {
            if let Err(err) = self.inventory.release(token) {
                tracing::error!(
                    product = %token.product_id,
                    quantity = token.quantity,
                    error = %err,
                    "Failed to release reservation during rollback"
                );
            }
        }
    }

    /// Record a `Failed` order for a request that got past validation but
    /// could not settle. Validation rejections record nothing. Recording
    /// is best-effort: a store failure here is logged, never allowed to
    /// mask the business error the caller is about to receive.
    fn record_failed(
        &self,
        request: &OrderRequest,
        lines: &[OrderLine],
        reference_id: ReferenceId,
    ) {
        let mut order = Order::pending(
            request.buyer_id,
            request.seller_id,
            request.marketplace,
            lines.to_vec(),
        );
        // Pending -> Failed is always a legal transition on a fresh order.
        if let Err(err) = order.transition_to(OrderStatus::Failed) {
            tracing::error!(order = %order.id, error = %err, "Failed to mark order failed");
            return;
        }
        match self.lock_orders() {
            Ok(mut orders) => {
                orders.insert(
                    order.id,
                    OrderRecord {
                        order,
                        reference_id,
                    },
                );
            }
            Err(err) => {
                tracing::error!(
                    buyer = %request.buyer_id,
                    error = %err,
                    "Failed to record failed order"
                );
            }
        }
    }

    fn emit_audit(&self, event: AuditEvent) {
        // Best-effort: the settlement already committed, so an audit
        // outage must not surface to the caller.
        if let Err(err) = self.audit.record(&event) {
            tracing::warn!(
                action = %event.action,
                reference = %event.reference_id,
                error = %err,
                "Audit sink rejected event"
            );
        }
    }
}

impl std::fmt::Debug for SettlementCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettlementCoordinator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

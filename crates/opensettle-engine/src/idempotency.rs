//! Settlement idempotency cache — prevents double-charging on retry.
//!
//! Each settlement request carries a client-supplied key scoped to the
//! buyer. The first request marks the key in flight; a concurrent
//! duplicate observes [`BeginOutcome::InFlight`] (surfaced to callers as
//! a retryable conflict); a retry after commit replays the original
//! [`SettlementReceipt`] instead of debiting again.
//!
//! The cache keeps a bounded LRU of completed receipts so memory stays
//! predictable in long-running processes. In-flight markers are never
//! evicted — only completed slots age out.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use opensettle_types::{IdempotencyKey, Result, SettleError, UserId};

use crate::coordinator::SettlementReceipt;

type CacheKey = (UserId, IdempotencyKey);

#[derive(Debug)]
enum Slot {
    InFlight,
    Done(SettlementReceipt),
}

/// Outcome of claiming an idempotency key at the start of a settlement.
#[derive(Debug)]
pub enum BeginOutcome {
    /// The key is new; the caller now holds the in-flight marker.
    Fresh,
    /// Another request with this key is mid-settlement.
    InFlight,
    /// A settlement with this key already committed.
    Replayed(SettlementReceipt),
}

#[derive(Debug, Default)]
struct CacheInner {
    slots: HashMap<CacheKey, Slot>,
    /// Completed keys in completion order (front = oldest).
    completed: VecDeque<CacheKey>,
}

/// Bounded, thread-safe store of settlement outcomes per `(buyer, key)`.
#[derive(Debug)]
pub struct IdempotencyCache {
    inner: Mutex<CacheInner>,
    max_size: usize,
}

impl IdempotencyCache {
    /// Create a cache retaining up to `max_size` completed receipts.
    ///
    /// # Panics
    /// Panics if `max_size` is zero.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "IdempotencyCache max_size must be > 0");
        Self {
            inner: Mutex::new(CacheInner::default()),
            max_size,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CacheInner>> {
        self.inner
            .lock()
            .map_err(|_| SettleError::StoreUnavailable("idempotency cache lock poisoned".into()))
    }

    /// Claim a key for a new settlement attempt.
    pub fn begin(&self, buyer: UserId, key: &IdempotencyKey) -> Result<BeginOutcome> {
        let mut inner = self.lock()?;
        let cache_key = (buyer, key.clone());
        match inner.slots.get(&cache_key) {
            Some(Slot::InFlight) => Ok(BeginOutcome::InFlight),
            Some(Slot::Done(receipt)) => Ok(BeginOutcome::Replayed(receipt.clone())),
            None => {
                inner.slots.insert(cache_key, Slot::InFlight);
                Ok(BeginOutcome::Fresh)
            }
        }
    }

    /// Store the committed receipt for a key previously claimed with
    /// [`Self::begin`]. Evicts the oldest completed slot at capacity.
    pub fn complete(&self, buyer: UserId, key: &IdempotencyKey, receipt: SettlementReceipt) -> Result<()> {
        let mut inner = self.lock()?;
        let cache_key = (buyer, key.clone());

        if inner.completed.len() >= self.max_size {
            if let Some(oldest) = inner.completed.pop_front() {
                inner.slots.remove(&oldest);
            }
        }

        inner.slots.insert(cache_key.clone(), Slot::Done(receipt));
        inner.completed.push_back(cache_key);
        Ok(())
    }

    /// Drop an in-flight marker after a failed settlement so the client
    /// may retry the same key. Completed slots are left untouched.
    pub fn abandon(&self, buyer: UserId, key: &IdempotencyKey) -> Result<()> {
        let mut inner = self.lock()?;
        let cache_key = (buyer, key.clone());
        if matches!(inner.slots.get(&cache_key), Some(Slot::InFlight)) {
            inner.slots.remove(&cache_key);
        }
        Ok(())
    }

    /// Number of keys currently tracked (in-flight + completed).
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.slots.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.slots.is_empty())
    }
}

// src/lib.rs
//! # dealer-ledger
//!
//! Versioned dealer account records over an externally supplied key-value
//! ledger. The crate owns the entity model, the deterministic wire codec,
//! and the CRUD + enumeration + history operations; consensus, transaction
//! ordering, and replication belong to the platform that submits the
//! transactions and are reached only through the [`WorldState`] contract.
//!
//! ```rust,ignore
//! use dealer_ledger::{adapters::MemoryWorldState, Dealer, DealerRegistry, Ledger};
//!
//! let ledger = Ledger::new(Box::new(MemoryWorldState::new()));
//! let ctx = ledger.begin();
//! DealerRegistry::seed(&ctx, &Dealer::genesis()).await?;
//! let dealer = DealerRegistry::read(&ctx, 1203).await?;
//! ```

pub mod adapters;
pub mod codec;
mod cursor;
pub mod dealer;
pub mod error;
pub mod registry;

pub use dealer::{Dealer, DealerUpdate};
pub use error::LedgerError;
pub use registry::{DealerRegistry, TransactionContext};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// One recorded modification of a key, as yielded by a history scan.
///
/// The store retains every version it ever committed; `value` is `None`
/// for a deletion tombstone.
#[derive(Debug, Clone)]
pub struct KeyModification {
    pub tx_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub value: Option<Vec<u8>>,
}

impl KeyModification {
    pub fn is_delete(&self) -> bool {
        self.value.is_none()
    }
}

/// Single-pass traversal over range-scan results.
///
/// A cursor lives inside the one operation that opened it: never reused
/// across operations, and closed before the operation returns, on every
/// exit path.
#[async_trait]
pub trait StateCursor: Send {
    /// Next `(key, value)` pair, or `None` once exhausted.
    async fn next(&mut self) -> Result<Option<(String, Vec<u8>)>, LedgerError>;
    async fn close(&mut self) -> Result<(), LedgerError>;
}

/// Single-pass traversal over the recorded versions of one key.
#[async_trait]
pub trait HistoryCursor: Send {
    async fn next(&mut self) -> Result<Option<KeyModification>, LedgerError>;
    async fn close(&mut self) -> Result<(), LedgerError>;
}

/// The external versioned key-value collaborator.
///
/// Implementations hold no contract state between calls; each method is a
/// single request/response cycle. Conflicting concurrent writes are the
/// platform's problem to serialize, not this trait's.
#[async_trait]
pub trait WorldState: Send + Sync {
    /// Current value at `key`, or `None` if absent (never written, or the
    /// newest version is a tombstone).
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Commit a new version of `key`.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;

    /// Cursor over current values in `[start_key, end_key)`. Empty bounds
    /// mean unbounded. Keys order lexicographically by byte value.
    async fn range_scan(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> Result<Box<dyn StateCursor>, LedgerError>;

    /// Cursor over every recorded version of `key`, in store-defined order.
    /// Both shipped adapters yield most recent first.
    async fn history_scan(&self, key: &str) -> Result<Box<dyn HistoryCursor>, LedgerError>;
}

/// Entry point tying a [`WorldState`] implementation to the operations in
/// [`registry`].
pub struct Ledger {
    state: Arc<dyn WorldState>,
}

impl Ledger {
    pub fn new(state: Box<dyn WorldState>) -> Self {
        Self {
            state: state.into(),
        }
    }

    pub fn state(&self) -> &dyn WorldState {
        self.state.as_ref()
    }

    pub fn state_arc(&self) -> Arc<dyn WorldState> {
        Arc::clone(&self.state)
    }

    /// Mint a context for one submitted transaction.
    pub fn begin(&self) -> TransactionContext {
        TransactionContext::new(self.state_arc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryWorldState;

    #[test]
    fn tombstone_detection() {
        let modification = KeyModification {
            tx_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            value: None,
        };
        assert!(modification.is_delete());
    }

    #[test]
    fn contexts_get_distinct_tx_ids() {
        let ledger = Ledger::new(Box::new(MemoryWorldState::new()));
        assert_ne!(ledger.begin().tx_id(), ledger.begin().tx_id());
    }
}

// src/registry.rs
//! The public operation set over dealer records.
//!
//! Every operation is one unit of work inside one externally submitted
//! transaction. Nothing is retried here and no state survives between
//! invocations; the platform that submits transactions serializes
//! conflicting writes and detects write-write conflicts at commit time.

use crate::{codec, cursor, Dealer, DealerUpdate, LedgerError, WorldState};
use metrics::{counter, histogram};
use std::sync::Arc;
use uuid::Uuid;

/// Capability handle for one submitted transaction.
///
/// The platform's transaction identity and its world state are passed in
/// explicitly; there is no ambient context anywhere in this crate.
#[derive(Clone)]
pub struct TransactionContext {
    tx_id: Uuid,
    state: Arc<dyn WorldState>,
}

impl TransactionContext {
    pub fn new(state: Arc<dyn WorldState>) -> Self {
        Self {
            tx_id: Uuid::now_v7(),
            state,
        }
    }

    pub fn tx_id(&self) -> Uuid {
        self.tx_id
    }

    pub fn state(&self) -> &dyn WorldState {
        self.state.as_ref()
    }
}

/// CRUD, enumeration, and history over dealer records.
pub struct DealerRegistry;

impl DealerRegistry {
    /// Write a batch of initial records, one put per record, keyed by
    /// decimal dealer id. Used once at ledger genesis. The first failing
    /// write aborts the call; earlier writes in the same batch are not
    /// rolled back. Batch atomicity belongs to the platform.
    pub async fn seed(ctx: &TransactionContext, dealers: &[Dealer]) -> Result<(), LedgerError> {
        let result = Self::write_all(ctx, dealers).await;
        counter!("dealer_ledger.operations.total",
            "op" => "seed",
            "status" => if result.is_ok() { "success" } else { "failed" }
        )
        .increment(1);
        result
    }

    async fn write_all(ctx: &TransactionContext, dealers: &[Dealer]) -> Result<(), LedgerError> {
        for dealer in dealers {
            let payload = codec::encode(dealer)?;
            ctx.state().put(&dealer.key(), payload).await?;
        }
        Ok(())
    }

    /// Write a new record unconditionally at its key. A record already
    /// stored under the same key is overwritten silently; callers that
    /// want a guard can check [`exists`](Self::exists) first.
    pub async fn create(ctx: &TransactionContext, dealer: &Dealer) -> Result<(), LedgerError> {
        let result = match codec::encode(dealer) {
            Ok(payload) => ctx.state().put(&dealer.key(), payload).await,
            Err(e) => Err(e),
        };
        histogram!("dealer_ledger.transaction.amount", "op" => "create")
            .record(dealer.trans_amount as f64);
        counter!("dealer_ledger.operations.total",
            "op" => "create",
            "status" => if result.is_ok() { "success" } else { "failed" }
        )
        .increment(1);
        result
    }

    /// Fetch and decode the record at `dealer_id`.
    pub async fn read(ctx: &TransactionContext, dealer_id: u64) -> Result<Dealer, LedgerError> {
        let key = dealer_id.to_string();
        let bytes = ctx
            .state()
            .get(&key)
            .await?
            .ok_or_else(|| LedgerError::NotFound(key.clone()))?;
        codec::decode(&key, &bytes)
    }

    /// Read-modify-write: fetch the record, replace its entire mutable
    /// field set, re-encode, and write back under the same key. The dealer
    /// id is taken from the stored record and never changes.
    pub async fn update(
        ctx: &TransactionContext,
        dealer_id: u64,
        fields: DealerUpdate,
    ) -> Result<(), LedgerError> {
        let amount = fields.trans_amount;
        let result = Self::update_inner(ctx, dealer_id, fields).await;
        histogram!("dealer_ledger.transaction.amount", "op" => "update").record(amount as f64);
        counter!("dealer_ledger.operations.total",
            "op" => "update",
            "status" => if result.is_ok() { "success" } else { "failed" }
        )
        .increment(1);
        result
    }

    async fn update_inner(
        ctx: &TransactionContext,
        dealer_id: u64,
        fields: DealerUpdate,
    ) -> Result<(), LedgerError> {
        let key = dealer_id.to_string();
        let bytes = ctx
            .state()
            .get(&key)
            .await?
            .ok_or_else(|| LedgerError::NotFound(key.clone()))?;

        let mut dealer = codec::decode(&key, &bytes)?;
        dealer.apply(fields);

        let payload = codec::encode(&dealer)?;
        ctx.state().put(&key, payload).await
    }

    /// True when a record is currently stored under `dealer_id`.
    pub async fn exists(ctx: &TransactionContext, dealer_id: u64) -> Result<bool, LedgerError> {
        Ok(ctx.state().get(&dealer_id.to_string()).await?.is_some())
    }

    /// Every current record, from one unbounded range scan. Results come
    /// back in lexicographic key order of the unpadded decimal keys, so
    /// "121" sorts after "1206". One undecodable entry fails the whole call.
    pub async fn get_all(ctx: &TransactionContext) -> Result<Vec<Dealer>, LedgerError> {
        let scan = ctx.state().range_scan("", "").await?;
        cursor::collect_range(scan).await
    }

    /// Every recorded version of one dealer, in the order the store yields
    /// them (most recent first for the shipped adapters). Tombstones left
    /// by platform-side deletions are skipped.
    pub async fn history(ctx: &TransactionContext, dealer_id: u64) -> Result<Vec<Dealer>, LedgerError> {
        let key = dealer_id.to_string();
        let scan = ctx.state().history_scan(&key).await?;
        cursor::collect_history(&key, scan).await
    }
}

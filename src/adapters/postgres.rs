// src/adapters/postgres.rs
use crate::{HistoryCursor, KeyModification, LedgerError, StateCursor, WorldState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::VecDeque;
use uuid::Uuid;

/// Durable versioned world state over one append-only Postgres table.
///
/// Every `put` appends a row; the current value of a key is its
/// highest-version row, with a NULL value marking a tombstone. Nothing is
/// ever updated or deleted in place, so per-key history falls out of the
/// same table.
pub struct PostgresWorldState {
    pool: PgPool,
}

impl PostgresWorldState {
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS world_state (
                key TEXT NOT NULL,
                version BIGSERIAL NOT NULL,
                value BYTEA,
                tx_id UUID NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (key, version)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Write {
            key: "world_state".to_string(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Platform-side deletion: appends a tombstone row. Not part of
    /// [`WorldState`]; exists so tests can exercise tombstone handling the
    /// way the platform would produce it.
    pub async fn delete(&self, key: &str) -> Result<(), LedgerError> {
        sqlx::query("INSERT INTO world_state (key, value, tx_id) VALUES ($1, NULL, $2)")
            .bind(key)
            .bind(Uuid::now_v7())
            .execute(&self.pool)
            .await
            .map_err(|e| LedgerError::Write {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }
}

#[async_trait]
impl WorldState for PostgresWorldState {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let row = sqlx::query(
            "SELECT value FROM world_state WHERE key = $1 ORDER BY version DESC LIMIT 1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LedgerError::Read {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        match row {
            Some(row) => row
                .try_get::<Option<Vec<u8>>, _>("value")
                .map_err(|e| LedgerError::Read {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        sqlx::query("INSERT INTO world_state (key, value, tx_id) VALUES ($1, $2, $3)")
            .bind(key)
            .bind(&value)
            .bind(Uuid::now_v7())
            .execute(&self.pool)
            .await
            .map_err(|e| LedgerError::Write {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }

    async fn range_scan(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> Result<Box<dyn StateCursor>, LedgerError> {
        let range = format!("[{},{})", start_key, end_key);

        // Latest version per key, tombstoned keys dropped, byte-order key
        // sort to match what the range contract promises.
        let rows = sqlx::query(
            r#"
            SELECT key, value FROM (
                SELECT DISTINCT ON (key) key, value
                FROM world_state
                WHERE ($1 = '' OR key >= $1) AND ($2 = '' OR key < $2)
                ORDER BY key, version DESC
            ) latest
            WHERE value IS NOT NULL
            ORDER BY key COLLATE "C"
            "#,
        )
        .bind(start_key)
        .bind(end_key)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LedgerError::Read {
            key: range.clone(),
            reason: e.to_string(),
        })?;

        let mut items = VecDeque::with_capacity(rows.len());
        for row in rows {
            let key: String = row.try_get("key").map_err(|e| LedgerError::Read {
                key: range.clone(),
                reason: e.to_string(),
            })?;
            let value: Vec<u8> = row.try_get("value").map_err(|e| LedgerError::Read {
                key: key.clone(),
                reason: e.to_string(),
            })?;
            items.push_back((key, value));
        }

        Ok(Box::new(BufferedRangeCursor { items }))
    }

    async fn history_scan(&self, key: &str) -> Result<Box<dyn HistoryCursor>, LedgerError> {
        let rows = sqlx::query(
            "SELECT tx_id, created_at, value FROM world_state WHERE key = $1 ORDER BY version DESC",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LedgerError::Read {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        let mut items = VecDeque::with_capacity(rows.len());
        for row in rows {
            let tx_id: Uuid = row.try_get("tx_id").map_err(|e| LedgerError::Read {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
            let timestamp: DateTime<Utc> =
                row.try_get("created_at").map_err(|e| LedgerError::Read {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
            let value: Option<Vec<u8>> = row.try_get("value").map_err(|e| LedgerError::Read {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
            items.push_back(KeyModification {
                tx_id,
                timestamp,
                value,
            });
        }

        Ok(Box::new(BufferedHistoryCursor { items }))
    }
}

// Scan results are buffered at scan time, so closing is just dropping the
// buffer; the single-pass, close-before-return discipline still applies to
// callers.
struct BufferedRangeCursor {
    items: VecDeque<(String, Vec<u8>)>,
}

#[async_trait]
impl StateCursor for BufferedRangeCursor {
    async fn next(&mut self) -> Result<Option<(String, Vec<u8>)>, LedgerError> {
        Ok(self.items.pop_front())
    }

    async fn close(&mut self) -> Result<(), LedgerError> {
        self.items.clear();
        Ok(())
    }
}

struct BufferedHistoryCursor {
    items: VecDeque<KeyModification>,
}

#[async_trait]
impl HistoryCursor for BufferedHistoryCursor {
    async fn next(&mut self) -> Result<Option<KeyModification>, LedgerError> {
        Ok(self.items.pop_front())
    }

    async fn close(&mut self) -> Result<(), LedgerError> {
        self.items.clear();
        Ok(())
    }
}

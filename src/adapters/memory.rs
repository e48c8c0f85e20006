// src/adapters/memory.rs
use crate::{HistoryCursor, KeyModification, LedgerError, StateCursor, WorldState};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory versioned world state, for unit tests and examples.
///
/// Every key maps to its full version chain, oldest first; the current
/// value is the newest version. Range scans come back in the `BTreeMap`'s
/// lexicographic key order.
pub struct MemoryWorldState {
    entries: Mutex<BTreeMap<String, Vec<KeyModification>>>,
    open_cursors: Arc<AtomicUsize>,
}

impl MemoryWorldState {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            open_cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Platform-side deletion: appends a tombstone version. Not part of
    /// [`WorldState`] because the record operations never delete, but the
    /// platform can, and history consumers must cope with the tombstones
    /// it leaves behind.
    pub fn delete(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.entry(key.to_string()).or_default().push(KeyModification {
            tx_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            value: None,
        });
    }

    /// Number of cursors handed out and not yet closed. Operations that
    /// scan are expected to leave this at zero, whichever way they exit.
    pub fn open_cursor_count(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }
}

impl Default for MemoryWorldState {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorldState for MemoryWorldState {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(key)
            .and_then(|versions| versions.last())
            .and_then(|m| m.value.clone()))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        let mut entries = self.entries.lock().unwrap();
        entries.entry(key.to_string()).or_default().push(KeyModification {
            tx_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            value: Some(value),
        });
        Ok(())
    }

    async fn range_scan(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> Result<Box<dyn StateCursor>, LedgerError> {
        let entries = self.entries.lock().unwrap();
        let items: VecDeque<(String, Vec<u8>)> = entries
            .iter()
            .filter(|(key, _)| {
                (start_key.is_empty() || key.as_str() >= start_key)
                    && (end_key.is_empty() || key.as_str() < end_key)
            })
            .filter_map(|(key, versions)| {
                versions
                    .last()
                    .and_then(|m| m.value.clone())
                    .map(|value| (key.clone(), value))
            })
            .collect();

        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryCursor {
            items,
            open_cursors: Arc::clone(&self.open_cursors),
            closed: false,
        }))
    }

    async fn history_scan(&self, key: &str) -> Result<Box<dyn HistoryCursor>, LedgerError> {
        let entries = self.entries.lock().unwrap();
        let items: VecDeque<KeyModification> = entries
            .get(key)
            .map(|versions| versions.iter().rev().cloned().collect())
            .unwrap_or_default();

        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryHistoryCursor {
            items,
            open_cursors: Arc::clone(&self.open_cursors),
            closed: false,
        }))
    }
}

struct MemoryCursor {
    items: VecDeque<(String, Vec<u8>)>,
    open_cursors: Arc<AtomicUsize>,
    closed: bool,
}

#[async_trait]
impl StateCursor for MemoryCursor {
    async fn next(&mut self) -> Result<Option<(String, Vec<u8>)>, LedgerError> {
        Ok(self.items.pop_front())
    }

    async fn close(&mut self) -> Result<(), LedgerError> {
        if !self.closed {
            self.closed = true;
            self.open_cursors.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

struct MemoryHistoryCursor {
    items: VecDeque<KeyModification>,
    open_cursors: Arc<AtomicUsize>,
    closed: bool,
}

#[async_trait]
impl HistoryCursor for MemoryHistoryCursor {
    async fn next(&mut self) -> Result<Option<KeyModification>, LedgerError> {
        Ok(self.items.pop_front())
    }

    async fn close(&mut self) -> Result<(), LedgerError> {
        if !self.closed {
            self.closed = true;
            self.open_cursors.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

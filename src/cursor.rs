// src/cursor.rs
//! Scoped draining of store cursors.
//!
//! Both helpers guarantee the cursor is closed before returning, whichever
//! way the drain ends. On a clean drain a close failure is surfaced; after
//! a failed drain the cursor is still closed but the drain error wins.

use crate::{codec, Dealer, HistoryCursor, LedgerError, StateCursor};

/// Drain a range cursor, decoding every entry. Any entry that fails to
/// decode fails the whole call; no partial result escapes.
pub(crate) async fn collect_range(
    mut cursor: Box<dyn StateCursor>,
) -> Result<Vec<Dealer>, LedgerError> {
    let drained = drain_range(cursor.as_mut()).await;
    match drained {
        Ok(dealers) => {
            cursor.close().await?;
            Ok(dealers)
        }
        Err(e) => {
            let _ = cursor.close().await;
            Err(e)
        }
    }
}

async fn drain_range(cursor: &mut dyn StateCursor) -> Result<Vec<Dealer>, LedgerError> {
    let mut dealers = Vec::new();
    while let Some((key, bytes)) = cursor.next().await? {
        dealers.push(codec::decode(&key, &bytes)?);
    }
    Ok(dealers)
}

/// Drain a history cursor for `key`, decoding every non-tombstone version
/// in the order the store yields them. Tombstones are skipped, not decoded.
pub(crate) async fn collect_history(
    key: &str,
    mut cursor: Box<dyn HistoryCursor>,
) -> Result<Vec<Dealer>, LedgerError> {
    let drained = drain_history(key, cursor.as_mut()).await;
    match drained {
        Ok(dealers) => {
            cursor.close().await?;
            Ok(dealers)
        }
        Err(e) => {
            let _ = cursor.close().await;
            Err(e)
        }
    }
}

async fn drain_history(
    key: &str,
    cursor: &mut dyn HistoryCursor,
) -> Result<Vec<Dealer>, LedgerError> {
    let mut dealers = Vec::new();
    while let Some(modification) = cursor.next().await? {
        if let Some(bytes) = modification.value {
            dealers.push(codec::decode(key, &bytes)?);
        }
    }
    Ok(dealers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyModification;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use uuid::Uuid;

    struct StubRangeCursor {
        items: VecDeque<(String, Vec<u8>)>,
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl StateCursor for StubRangeCursor {
        async fn next(&mut self) -> Result<Option<(String, Vec<u8>)>, LedgerError> {
            Ok(self.items.pop_front())
        }

        async fn close(&mut self) -> Result<(), LedgerError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct StubHistoryCursor {
        items: VecDeque<KeyModification>,
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl HistoryCursor for StubHistoryCursor {
        async fn next(&mut self) -> Result<Option<KeyModification>, LedgerError> {
            Ok(self.items.pop_front())
        }

        async fn close(&mut self) -> Result<(), LedgerError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn encoded(id: u64) -> (String, Vec<u8>) {
        let dealer = Dealer::new(id, "+91 000000", "0000", 0, "SUCCESS", 0, "ONLINE", "YES");
        (dealer.key(), codec::encode(&dealer).unwrap())
    }

    fn modification(value: Option<Vec<u8>>) -> KeyModification {
        KeyModification {
            tx_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            value,
        }
    }

    #[tokio::test]
    async fn range_drain_closes_on_success() {
        let closed = Arc::new(AtomicBool::new(false));
        let cursor = Box::new(StubRangeCursor {
            items: [encoded(1), encoded(2)].into(),
            closed: Arc::clone(&closed),
        });

        let dealers = collect_range(cursor).await.unwrap();
        assert_eq!(dealers.len(), 2);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn range_drain_closes_on_decode_failure() {
        let closed = Arc::new(AtomicBool::new(false));
        let cursor = Box::new(StubRangeCursor {
            items: [encoded(1), ("2".to_string(), b"not json".to_vec())].into(),
            closed: Arc::clone(&closed),
        });

        let err = collect_range(cursor).await.unwrap_err();
        assert!(matches!(err, LedgerError::Decode { key, .. } if key == "2"));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn history_drain_skips_tombstones_and_closes() {
        let closed = Arc::new(AtomicBool::new(false));
        let (_, bytes) = encoded(9);
        let cursor = Box::new(StubHistoryCursor {
            items: [
                modification(Some(bytes.clone())),
                modification(None),
                modification(Some(bytes)),
            ]
            .into(),
            closed: Arc::clone(&closed),
        });

        let dealers = collect_history("9", cursor).await.unwrap();
        assert_eq!(dealers.len(), 2);
        assert!(closed.load(Ordering::SeqCst));
    }
}

// ./src/store/memory.rs

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use tokio::sync::broadcast;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{RecordId, RecordInput, TransactionRecord};

use super::{feed_channel, order_snapshot, LiveFeed, RecordStore, Snapshot};

/// In-memory record store. Backs tests and ephemeral demo runs; mirrors the
/// contract of the persistent backend exactly.
pub struct MemoryStore {
    inner: RwLock<Inner>,
    feed_tx: broadcast::Sender<Snapshot>,
}

struct Inner {
    /// Records paired with their insertion sequence, in insertion order.
    records: Vec<(u64, TransactionRecord)>,
    seq: u64,
    last_timestamp: Option<DateTime<Utc>>,
    nullifiers: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: Vec::new(),
                seq: 0,
                last_timestamp: None,
                nullifiers: HashSet::new(),
            }),
            feed_tx: feed_channel(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    /// Clamps the wall clock so timestamps never decrease in insertion order.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(prev) if now < prev => prev,
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn append(&self, input: RecordInput) -> Result<RecordId, StoreError> {
        let mut inner = self.inner.write().await;

        if let Some(nullifier) = input.nullifier.as_deref() {
            if inner.nullifiers.contains(nullifier) {
                warn!("rejected reuse of nullifier {}", nullifier);
                return Err(StoreError::DuplicateNullifier(nullifier.to_string()));
            }
        }

        let id = Uuid::new_v4();
        let timestamp = inner.next_timestamp();
        let record = TransactionRecord {
            id,
            sender: input.sender,
            recipient: input.recipient,
            amount: input.amount,
            signature: input.signature,
            is_private: input.is_private,
            status: input.status,
            commitment: input.commitment,
            nullifier: input.nullifier,
            timestamp,
        };

        if let Some(nullifier) = record.nullifier.clone() {
            inner.nullifiers.insert(nullifier);
        }
        let seq = inner.seq;
        inner.seq += 1;
        inner.records.push((seq, record));
        debug!("appended record {} (seq {})", id, seq);

        // Re-deliver the full ordered list to every open feed.
        let _ = self.feed_tx.send(order_snapshot(&inner.records));
        Ok(id)
    }

    async fn subscribe_recent(&self, limit: usize) -> LiveFeed {
        let inner = self.inner.read().await;
        // Subscribe while holding the lock: no append can slip between the
        // initial snapshot and the subscription.
        let rx = self.feed_tx.subscribe();
        LiveFeed::new(limit, order_snapshot(&inner.records), rx)
    }

    async fn find_by_signature(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .iter()
            .find(|(_, r)| r.signature == signature)
            .map(|(_, r)| r.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TxStatus;

    fn input(signature: &str, nullifier: Option<&str>) -> RecordInput {
        RecordInput {
            sender: "sender".into(),
            recipient: "recipient".into(),
            amount: 1.0,
            signature: signature.into(),
            is_private: nullifier.is_some(),
            status: TxStatus::Confirmed,
            commitment: nullifier.map(|_| format!("0x{}", "c".repeat(64))),
            nullifier: nullifier.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_append_assigns_id_and_monotonic_timestamps() {
        let store = MemoryStore::new();
        store.append(input("sig-a", None)).await.unwrap();
        store.append(input("sig-b", None)).await.unwrap();

        let a = store.find_by_signature("sig-a").await.unwrap().unwrap();
        let b = store.find_by_signature("sig-b").await.unwrap().unwrap();
        assert_ne!(a.id, b.id);
        assert!(b.timestamp >= a.timestamp);
    }

    #[tokio::test]
    async fn test_duplicate_nullifier_rejected() {
        let store = MemoryStore::new();
        store.append(input("sig-a", Some("n1"))).await.unwrap();

        let err = store.append(input("sig-b", Some("n1"))).await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateNullifier("n1".into()));
        assert!(store.find_by_signature("sig-b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_miss_is_ok_none() {
        let store = MemoryStore::new();
        assert_eq!(store.find_by_signature("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_feed_initial_snapshot_and_redelivery() {
        let store = MemoryStore::new();
        store.append(input("sig-a", None)).await.unwrap();

        let mut feed = store.subscribe_recent(10).await;
        let first = feed.next().await.unwrap();
        assert_eq!(first.len(), 1);

        store.append(input("sig-b", None)).await.unwrap();
        let second = feed.next().await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].signature, "sig-b");
        assert_eq!(second[1].signature, "sig-a");
    }

    #[tokio::test]
    async fn test_feed_clips_to_limit() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.append(input(&format!("sig-{}", i), None)).await.unwrap();
        }

        let mut feed = store.subscribe_recent(3).await;
        let snapshot = feed.next().await.unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].signature, "sig-4");
    }
}

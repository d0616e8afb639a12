// ./src/store/sled_store.rs

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::sync::broadcast;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{RecordId, RecordInput, TransactionRecord};

use super::{feed_channel, order_snapshot, LiveFeed, RecordStore, Snapshot};

/// Sled-backed record store. Records are stored as JSON values keyed by a
/// big-endian insertion sequence, so a plain scan yields insertion order.
/// An in-memory index mirrors the tree for feed snapshots and lookups.
pub struct SledStore {
    db: sled::Db,
    inner: RwLock<Inner>,
    feed_tx: broadcast::Sender<Snapshot>,
}

struct Inner {
    records: Vec<(u64, TransactionRecord)>,
    seq: u64,
    last_timestamp: Option<DateTime<Utc>>,
    nullifiers: HashSet<String>,
}

impl SledStore {
    /// Opens (or creates) the store at `path` and rebuilds the in-memory
    /// index from the persisted records.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path.as_ref()).context("failed to open ledger database")?;

        let mut records = Vec::new();
        let mut nullifiers = HashSet::new();
        let mut seq = 0u64;
        let mut last_timestamp = None;
        for item in db.iter() {
            let (key, value) = item.context("failed to scan ledger database")?;
            let seq_bytes: [u8; 8] = key
                .as_ref()
                .try_into()
                .context("unexpected key length in ledger database")?;
            let record: TransactionRecord =
                serde_json::from_slice(&value).context("failed to decode persisted record")?;
            let record_seq = u64::from_be_bytes(seq_bytes);
            seq = seq.max(record_seq + 1);
            last_timestamp = Some(record.timestamp);
            if let Some(nullifier) = record.nullifier.clone() {
                nullifiers.insert(nullifier);
            }
            records.push((record_seq, record));
        }
        info!("opened ledger store with {} records", records.len());

        Ok(Self {
            db,
            inner: RwLock::new(Inner { records, seq, last_timestamp, nullifiers }),
            feed_tx: feed_channel(),
        })
    }

    fn seq_key(seq: u64) -> [u8; 8] {
        seq.to_be_bytes()
    }
}

impl Inner {
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
impl RecordStore for SledStore {
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

        let encoded =
            serde_json::to_vec(&record).map_err(|e| StoreError::Encoding(e.to_string()))?;
        let seq = inner.seq;
        self.db
            .insert(Self::seq_key(seq), encoded)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        self.db
            .flush_async()
            .await
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        if let Some(nullifier) = record.nullifier.clone() {
            inner.nullifiers.insert(nullifier);
        }
        inner.seq += 1;
        inner.records.push((seq, record));
        debug!("appended record {} (seq {})", id, seq);

        let _ = self.feed_tx.send(order_snapshot(&inner.records));
        Ok(id)
    }

    async fn subscribe_recent(&self, limit: usize) -> LiveFeed {
        let inner = self.inner.read().await;
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
    use tempfile::TempDir;

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
    async fn test_append_and_lookup() {
        let dir = TempDir::new().unwrap();
        let store = SledStore::open(dir.path()).unwrap();

        let id = store.append(input("sig-a", None)).await.unwrap();
        let found = store.find_by_signature("sig-a").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert!(store.find_by_signature("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reopen_rebuilds_index_and_nullifier_set() {
        let dir = TempDir::new().unwrap();
        {
            let store = SledStore::open(dir.path()).unwrap();
            store.append(input("sig-a", Some("n1"))).await.unwrap();
            store.append(input("sig-b", None)).await.unwrap();
        }

        let store = SledStore::open(dir.path()).unwrap();
        assert!(store.find_by_signature("sig-a").await.unwrap().is_some());

        // The nullifier set survives reopen, so the replay is still caught.
        let err = store.append(input("sig-c", Some("n1"))).await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateNullifier("n1".into()));

        let mut feed = store.subscribe_recent(10).await;
        let snapshot = feed.next().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].signature, "sig-b");
    }

    #[tokio::test]
    async fn test_feed_redelivers_on_append() {
        let dir = TempDir::new().unwrap();
        let store = SledStore::open(dir.path()).unwrap();

        let mut feed = store.subscribe_recent(10).await;
        assert!(feed.next().await.unwrap().is_empty());

        store.append(input("sig-a", None)).await.unwrap();
        let snapshot = feed.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].signature, "sig-a");
    }
}

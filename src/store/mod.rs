// ./src/store/mod.rs
//! Persistence and live-synchronization boundary
//!
//! The rest of the system consumes three operations -- append, subscribe,
//! point lookup -- independent of the concrete backend. Two backends are
//! provided: an in-memory store and a sled-backed persistent store.

mod memory;
mod sled_store;

use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use tokio::sync::broadcast;

use crate::error::StoreError;
use crate::types::{RecordId, RecordInput, TransactionRecord};

pub use memory::MemoryStore;
pub use sled_store::SledStore;

/// One full ordered view of the store's records, newest first. Shared
/// across all feeds of a store, so pushing it is a pointer copy.
pub type Snapshot = Arc<Vec<TransactionRecord>>;

/// Capacity of the per-store feed channel. A subscriber that falls further
/// behind than this skips ahead to the latest snapshot.
const FEED_BUFFER: usize = 32;

/// The record store contract.
///
/// Semantics shared by every backend:
/// - `append` assigns the identifier and a timestamp clamped to be
///   monotonically non-decreasing in insertion order, and rejects a
///   nullifier that was already spent. At-least-once: nothing dedupes two
///   otherwise-identical submissions.
/// - `subscribe_recent` delivers the current top-`limit` records ordered by
///   timestamp descending (ties broken by descending insertion sequence),
///   then re-delivers the full ordered list on every subsequent insertion
///   anywhere in the store until the feed is dropped.
/// - `find_by_signature` is an exact-match point lookup returning the first
///   match in insertion order; a miss is `Ok(None)`, never an error.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn append(&self, input: RecordInput) -> Result<RecordId, StoreError>;

    async fn subscribe_recent(&self, limit: usize) -> LiveFeed;

    async fn find_by_signature(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionRecord>, StoreError>;
}

/// A live, push-based view over recent records.
///
/// Scoped resource: dropping the feed unsubscribes deterministically. The
/// feed is eventually consistent -- a slow consumer may observe coalesced
/// snapshots, but always converges to the latest one.
pub struct LiveFeed {
    limit: usize,
    pending: Option<Snapshot>,
    rx: broadcast::Receiver<Snapshot>,
}

impl LiveFeed {
    pub(crate) fn new(limit: usize, initial: Snapshot, rx: broadcast::Receiver<Snapshot>) -> Self {
        Self { limit, pending: Some(initial), rx }
    }

    /// Waits for the next pushed snapshot, clipped to this feed's limit.
    /// The first call resolves immediately with the state at subscription
    /// time. Returns `None` once the store has gone away.
    pub async fn next(&mut self) -> Option<Vec<TransactionRecord>> {
        if let Some(snapshot) = self.pending.take() {
            return Some(self.clip(&snapshot));
        }
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => return Some(self.clip(&snapshot)),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!("live feed lagged, skipped {} snapshots", missed);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn clip(&self, snapshot: &Snapshot) -> Vec<TransactionRecord> {
        snapshot.iter().take(self.limit).cloned().collect()
    }
}

/// Orders `(insertion sequence, record)` pairs into a feed snapshot:
/// timestamp descending, ties broken by descending sequence so the later
/// append sorts first.
fn order_snapshot(records: &[(u64, TransactionRecord)]) -> Snapshot {
    let mut indexed: Vec<&(u64, TransactionRecord)> = records.iter().collect();
    indexed.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp).then(b.0.cmp(&a.0)));
    Arc::new(indexed.into_iter().map(|(_, r)| r.clone()).collect())
}

fn feed_channel() -> broadcast::Sender<Snapshot> {
    broadcast::channel(FEED_BUFFER).0
}

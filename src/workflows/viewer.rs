// ./src/workflows/viewer.rs
//! Ledger viewer
//!
//! Holds a live feed for its lifetime (dropping the viewer releases the
//! subscription), tracks a client-side selection, and runs exact-signature
//! search and the simulated verification against the selected record.

use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::config::LedgerConfig;
use crate::error::StoreError;
use crate::store::{LiveFeed, RecordStore};
use crate::types::TransactionRecord;

use super::verification::{verify_record, VerificationState};

/// Result of an exact-signature search. A miss is explicit and leaves the
/// prior selection untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(TransactionRecord),
    NotFound,
}

pub struct LedgerViewer<S> {
    store: Arc<S>,
    feed: LiveFeed,
    recent: Vec<TransactionRecord>,
    selected: Option<TransactionRecord>,
    /// Bumped on every selection change; guards stale verification results.
    selection_epoch: u64,
    verification: VerificationState,
    verify_delay: Duration,
}

impl<S: RecordStore> LedgerViewer<S> {
    /// Subscribes to the store's live feed with the given limit. The feed
    /// stays open until the viewer is dropped.
    pub async fn attach(store: Arc<S>, limit: usize) -> Self {
        let feed = store.subscribe_recent(limit).await;
        Self {
            store,
            feed,
            recent: Vec::new(),
            selected: None,
            selection_epoch: 0,
            verification: VerificationState::Idle,
            verify_delay: LedgerConfig::default().verify_delay(),
        }
    }

    pub async fn attach_with_config(store: Arc<S>, limit: usize, config: &LedgerConfig) -> Self {
        let mut viewer = Self::attach(store, limit).await;
        viewer.verify_delay = config.verify_delay();
        viewer
    }

    /// Applies the next pushed snapshot. Returns `false` once the store has
    /// gone away and the feed is closed.
    pub async fn poll_feed(&mut self) -> bool {
        match self.feed.next().await {
            Some(snapshot) => {
                self.recent = snapshot;
                true
            }
            None => false,
        }
    }

    pub fn recent(&self) -> &[TransactionRecord] {
        &self.recent
    }

    pub fn selected(&self) -> Option<&TransactionRecord> {
        self.selected.as_ref()
    }

    pub fn verification(&self) -> VerificationState {
        self.verification
    }

    /// Selects a record; pure client-side state. Any prior verification
    /// result is discarded.
    pub fn select(&mut self, record: TransactionRecord) {
        debug!("selected record {}", record.id);
        self.selected = Some(record);
        self.selection_epoch += 1;
        self.verification = VerificationState::Idle;
    }

    /// Exact-match lookup by signature. On a hit the found record becomes
    /// the selection; on a miss the prior selection is left unchanged.
    pub async fn search(&mut self, signature: &str) -> Result<SearchOutcome, StoreError> {
        let signature = signature.trim();
        if signature.is_empty() {
            return Ok(SearchOutcome::NotFound);
        }
        match self.store.find_by_signature(signature).await? {
            Some(record) => {
                self.select(record.clone());
                Ok(SearchOutcome::Found(record))
            }
            None => {
                debug!("no record with signature {}", signature);
                Ok(SearchOutcome::NotFound)
            }
        }
    }

    /// Runs the simulated verification against the selected record. The
    /// result is applied only if the selection is still the same once the
    /// delay elapses; a superseded result is dropped.
    pub async fn verify_selected(&mut self) -> VerificationState {
        let Some(record) = self.selected.clone() else {
            return self.verification;
        };
        let epoch = self.selection_epoch;
        self.verification = VerificationState::Verifying;
        let outcome = verify_record(&record, self.verify_delay).await;
        if self.selection_epoch == epoch {
            self.verification = outcome;
        }
        self.verification
    }
}

// ./src/types.rs
//! Core record types for the ledger
//!
//! The wire shape matches the external document-store schema: camelCase
//! field names, lowercase status values, RFC 3339 timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned identifier for a persisted record.
pub type RecordId = Uuid;

/// Settlement status of a record. Set at creation and never transitioned
/// afterwards in the current design; the enum keeps all three states so a
/// future reconciliation step can republish pending records.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

/// A transfer as the submission workflow hands it to the store, before the
/// store assigns an identifier and a timestamp.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    pub signature: String,
    pub is_private: bool,
    pub status: TxStatus,
    /// Present iff the transfer is private and a secret was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment: Option<String>,
    /// Present iff `commitment` is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullifier: Option<String>,
}

/// A persisted transaction record. Created exactly once, never mutated or
/// deleted; copies held outside the store are read-only snapshots.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: RecordId,
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    pub signature: String,
    pub is_private: bool,
    pub status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullifier: Option<String>,
    /// Store-assigned creation time, monotonically non-decreasing in
    /// insertion order.
    pub timestamp: DateTime<Utc>,
}

impl TransactionRecord {
    /// True when the record is private and actually carries a commitment.
    pub fn is_shielded(&self) -> bool {
        self.is_private && self.commitment.as_deref().is_some_and(|c| !c.is_empty())
    }
}

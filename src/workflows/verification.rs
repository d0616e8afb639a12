// ./src/workflows/verification.rs
//! Simulated proof verification
//!
//! ## Security Notice
//!
//! This is a presence check with an artificial delay, not a cryptographic
//! verification: it only inspects the shape of the record (private flag plus
//! non-empty commitment and nullifier) and recomputes nothing -- the
//! verifier never holds the secret. A real deployment must swap the body of
//! [`verify_record`] for an actual proof check against the commitment,
//! nullifier and statement; the record -> pass/fail contract stays the same.

use std::time::Duration;

use log::debug;

use crate::types::TransactionRecord;

/// Where a verification attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationState {
    Idle,
    Verifying,
    Verified,
    Rejected,
}

impl VerificationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, VerificationState::Verified | VerificationState::Rejected)
    }
}

/// The verification policy: private, and both shielding fields present and
/// non-empty.
pub fn check_shielding(record: &TransactionRecord) -> bool {
    record.is_private
        && record.commitment.as_deref().is_some_and(|c| !c.is_empty())
        && record.nullifier.as_deref().is_some_and(|n| !n.is_empty())
}

/// Runs the simulated check against an already-fetched record, taking
/// `delay` to mimic asynchronous proof verification. No store access.
pub async fn verify_record(record: &TransactionRecord, delay: Duration) -> VerificationState {
    tokio::time::sleep(delay).await;
    let outcome = if check_shielding(record) {
        VerificationState::Verified
    } else {
        VerificationState::Rejected
    };
    debug!("verification of {} -> {:?}", record.id, outcome);
    outcome
}

// ./src/workflows/submission.rs
//! Submission workflow
//!
//! Single linear flow, no retries:
//! `Idle -> Validating -> (Deriving ->) Writing -> Done | Failed`.
//! Validation rejections carry user-facing text and leave the form intact;
//! a store failure surfaces a generic message and also retains the input.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::LedgerConfig;
use crate::error::ValidationError;
use crate::keygen::generate_signature;
use crate::shielding::{derive_commitment, derive_nullifier};
use crate::store::RecordStore;
use crate::types::{RecordId, RecordInput, TxStatus};

/// Wallet authentication context, supplied by the (out-of-scope) wallet UI.
#[derive(Debug, Clone, Default)]
pub struct WalletSession {
    authenticated: bool,
    address: Option<String>,
}

impl WalletSession {
    pub fn connected(address: impl Into<String>) -> Self {
        Self { authenticated: true, address: Some(address.into()) }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

/// The submission input form. `amount` stays a string until validation, as
/// it arrives from a free-form input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionForm {
    pub recipient: String,
    pub amount: String,
    pub is_private: bool,
    pub secret: String,
}

impl Default for SubmissionForm {
    fn default() -> Self {
        Self {
            recipient: String::new(),
            amount: "1.0".to_string(),
            is_private: true,
            secret: String::new(),
        }
    }
}

impl SubmissionForm {
    /// Clears the fields a successful submission resets; the privacy toggle
    /// keeps its position.
    pub fn reset(&mut self) {
        self.recipient.clear();
        self.amount = "1.0".to_string();
        self.secret.clear();
    }
}

/// Form state shared with the timed reset task.
///
/// Every edit bumps an epoch; a scheduled reset only fires if the epoch is
/// unchanged when its timer elapses, so a reset from a superseded
/// submission never clobbers fresh input.
#[derive(Clone)]
pub struct SharedForm {
    cell: Arc<Mutex<FormCell>>,
}

struct FormCell {
    form: SubmissionForm,
    epoch: u64,
}

impl SharedForm {
    pub fn new(form: SubmissionForm) -> Self {
        Self { cell: Arc::new(Mutex::new(FormCell { form, epoch: 0 })) }
    }

    pub fn snapshot(&self) -> SubmissionForm {
        self.lock().form.clone()
    }

    /// Applies an edit and invalidates any pending reset.
    pub fn edit(&self, apply: impl FnOnce(&mut SubmissionForm)) {
        let mut cell = self.lock();
        apply(&mut cell.form);
        cell.epoch += 1;
    }

    /// Schedules a non-blocking form reset after `delay`. Called on a
    /// successful submission; edits made in the meantime win over the timer.
    pub fn schedule_reset(&self, delay: Duration) {
        let cell = Arc::clone(&self.cell);
        let scheduled_epoch = self.lock().epoch;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut cell = cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if cell.epoch == scheduled_epoch {
                cell.form.reset();
                cell.epoch += 1;
            }
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FormCell> {
        self.cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SharedForm {
    fn default() -> Self {
        Self::new(SubmissionForm::default())
    }
}

/// Where a submission attempt currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Deriving,
    Writing,
    Done(RecordId),
    Failed,
}

/// Terminal result of a submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// Record accepted by the store.
    Submitted { id: RecordId, signature: String },
    /// Validation rejection; `reason` is the text shown to the user.
    Rejected { reason: String },
    /// Store write failure, surfaced generically.
    Failed { message: String },
}

impl SubmissionOutcome {
    /// The status line shown to the user for this outcome.
    pub fn status_text(&self) -> &str {
        match self {
            SubmissionOutcome::Submitted { .. } => "Transaction sent successfully!",
            SubmissionOutcome::Rejected { reason } => reason,
            SubmissionOutcome::Failed { message } => message,
        }
    }
}

struct ValidatedInput {
    sender: String,
    recipient: String,
    amount: f64,
    secret: Option<String>,
}

/// Drives one submission at a time against a record store.
pub struct SubmissionWorkflow<S> {
    store: Arc<S>,
    secret_max_len: usize,
    state: SubmissionState,
}

impl<S: RecordStore> SubmissionWorkflow<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, &LedgerConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: &LedgerConfig) -> Self {
        Self { store, secret_max_len: config.secret_max_len, state: SubmissionState::Idle }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Runs the full flow for one attempt. Rejections and failures are
    /// returned as outcomes, never as panics; the caller keeps the form.
    pub async fn submit(
        &mut self,
        session: &WalletSession,
        form: &SubmissionForm,
    ) -> SubmissionOutcome {
        self.state = SubmissionState::Validating;
        let validated = match self.validate(session, form) {
            Ok(v) => v,
            Err(e) => {
                debug!("submission rejected: {}", e);
                self.state = SubmissionState::Failed;
                return SubmissionOutcome::Rejected { reason: e.to_string() };
            }
        };

        // Shielding fields are all-or-nothing: derivation runs only when a
        // secret survived validation, and writes nothing partial.
        let shielding = match &validated.secret {
            Some(secret) => {
                self.state = SubmissionState::Deriving;
                let derived = derive_commitment(secret)
                    .and_then(|c| derive_nullifier(secret).map(|n| (c, n)));
                match derived {
                    Ok(pair) => Some(pair),
                    Err(e) => {
                        self.state = SubmissionState::Failed;
                        return SubmissionOutcome::Rejected { reason: e.to_string() };
                    }
                }
            }
            None => None,
        };

        self.state = SubmissionState::Writing;
        let signature = generate_signature();
        let (commitment, nullifier) = match shielding {
            Some((c, n)) => (Some(c), Some(n)),
            None => (None, None),
        };
        let input = RecordInput {
            sender: validated.sender,
            recipient: validated.recipient,
            amount: validated.amount,
            signature: signature.clone(),
            is_private: form.is_private,
            // No asynchronous settlement is modeled; records are born
            // confirmed.
            status: TxStatus::Confirmed,
            commitment,
            nullifier,
        };

        match self.store.append(input).await {
            Ok(id) => {
                info!("submitted record {}", id);
                self.state = SubmissionState::Done(id);
                SubmissionOutcome::Submitted { id, signature }
            }
            Err(e) => {
                warn!("store append failed: {}", e);
                self.state = SubmissionState::Failed;
                SubmissionOutcome::Failed { message: "Failed to send transaction".to_string() }
            }
        }
    }

    fn validate(
        &self,
        session: &WalletSession,
        form: &SubmissionForm,
    ) -> Result<ValidatedInput, ValidationError> {
        if !session.is_authenticated() {
            return Err(ValidationError::WalletNotConnected);
        }
        let sender = match session.address() {
            Some(addr) if !addr.is_empty() => addr.to_string(),
            _ => return Err(ValidationError::WalletNotConnected),
        };

        if form.recipient.trim().is_empty() || form.amount.trim().is_empty() {
            return Err(ValidationError::MissingRecipientOrAmount);
        }
        let amount: f64 = form
            .amount
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidAmount)?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::InvalidAmount);
        }

        let secret = if form.is_private {
            if form.secret.is_empty() {
                return Err(ValidationError::MissingSecret);
            }
            if form.secret.chars().count() > self.secret_max_len {
                return Err(ValidationError::SecretTooLong(self.secret_max_len));
            }
            Some(form.secret.clone())
        } else {
            None
        };

        Ok(ValidatedInput {
            sender,
            recipient: form.recipient.trim().to_string(),
            amount,
            secret,
        })
    }
}

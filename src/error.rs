// ./src/error.rs
//! Error types for the Zync PoC ledger
//!
//! This module defines error types used throughout the library. Validation
//! rejections double as user-facing text: the submission workflow surfaces
//! them inline instead of propagating a panic or an opaque failure.

use thiserror::Error;

/// The main error type for the ledger library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Submission input rejections
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Shielding derivation errors
    #[error(transparent)]
    Derivation(#[from] DerivationError),

    /// Record store errors
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Rejections raised while validating a submission.
///
/// The `Display` text of each variant is the message shown to the user;
/// every rejection is terminal for that attempt and leaves the form intact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    /// No authenticated wallet session
    #[error("Please connect your wallet first")]
    WalletNotConnected,

    /// Recipient or amount left empty
    #[error("Please fill in recipient and amount")]
    MissingRecipientOrAmount,

    /// Amount did not parse as a finite, non-negative number
    #[error("Amount must be a non-negative number")]
    InvalidAmount,

    /// Private transfer requested without a secret
    #[error("Secret is required for private transactions")]
    MissingSecret,

    /// Secret exceeds the input length bound
    #[error("Secret must be at most {0} characters")]
    SecretTooLong(usize),
}

/// Errors that can occur during commitment/nullifier derivation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DerivationError {
    /// The index arithmetic is degenerate for a zero-length secret;
    /// validation must reject this before the deriver is reached.
    #[error("Secret must not be empty")]
    EmptySecret,
}

/// Errors that can occur at the record store boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// Backend write or connectivity failure
    #[error("store write failed: {0}")]
    WriteFailed(String),

    /// Record could not be encoded for persistence
    #[error("record encoding failed: {0}")]
    Encoding(String),

    /// A record with this nullifier already exists; replaying the same
    /// shielded note is rejected at write time.
    #[error("nullifier already spent: {0}")]
    DuplicateNullifier(String),
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

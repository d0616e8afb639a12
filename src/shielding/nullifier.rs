// ./src/shielding/nullifier.rs

use sha2::{Digest, Sha256};

use crate::error::DerivationError;

/// Length of a nullifier, in hex characters.
pub const NULLIFIER_HEX_LEN: usize = 64;

/// Domain-separation tag; keeps the nullifier unlinkable to the commitment
/// even though both derive from the same secret.
const NULLIFIER_DOMAIN: &[u8] = b"zync.nullifier.v1";

/// Deterministically derives the nullifier for a shielded note: the SHA-256
/// digest of a fixed domain tag plus the secret bytes, hex-encoded.
///
/// Replaying the same secret always yields the same nullifier, which is what
/// lets the store detect double-spends by uniqueness-checking nullifiers at
/// write time. Without the secret the nullifier cannot be linked to the
/// commitment, since the two take different derivation paths.
pub fn derive_nullifier(secret: &str) -> Result<String, DerivationError> {
    if secret.is_empty() {
        return Err(DerivationError::EmptySecret);
    }

    let mut hasher = Sha256::new();
    hasher.update(NULLIFIER_DOMAIN);
    hasher.update(secret.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

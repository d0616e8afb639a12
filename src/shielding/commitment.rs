// ./src/shielding/commitment.rs

use crate::error::DerivationError;

/// Fixed marker prepended to every commitment.
pub const COMMITMENT_PREFIX: &str = "0x";

/// Number of hex characters following the prefix.
pub const COMMITMENT_HEX_LEN: usize = 64;

const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

/// Deterministically maps a secret to a 66-character commitment string
/// (`0x` prefix + 64 hex characters).
///
/// For output position `i`, the hex-alphabet index is
/// `(code_unit(secret, i % len) + i) % 16`, where `code_unit` is the
/// UTF-16 code unit of the secret. Equal secrets always yield equal
/// commitments.
///
/// NOT cryptographic: the mapping leaks secret length and is trivially
/// position-biased. It simulates a one-way derivation for display purposes
/// only.
///
/// Returns [`DerivationError::EmptySecret`] for a zero-length secret; the
/// position arithmetic is degenerate there and must never be reached.
pub fn derive_commitment(secret: &str) -> Result<String, DerivationError> {
    if secret.is_empty() {
        return Err(DerivationError::EmptySecret);
    }

    let units: Vec<u16> = secret.encode_utf16().collect();
    let mut out = String::with_capacity(COMMITMENT_PREFIX.len() + COMMITMENT_HEX_LEN);
    out.push_str(COMMITMENT_PREFIX);
    for i in 0..COMMITMENT_HEX_LEN {
        let code = units[i % units.len()] as usize;
        out.push(HEX_CHARS[(code + i) % HEX_CHARS.len()] as char);
    }
    Ok(out)
}

// ./src/keygen.rs
//! Opaque identifier generation
//!
//! Produces the pseudo-random strings that stand in for on-chain addresses
//! and transaction signatures in this demonstration. Output length and
//! alphabet are exact; uniqueness is not guaranteed and not required --
//! collisions are theoretically possible and treated as negligible.

use rand::{Error, Rng, RngCore};

/// Length of a generated address, in characters.
pub const ADDRESS_LEN: usize = 44;

/// Length of a generated signature, in hex characters.
pub const SIGNATURE_LEN: usize = 128;

/// Address alphabet: alphanumerics minus the visually ambiguous 0, O, I, l.
pub const ADDRESS_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz123456789";

const HEX_ALPHABET: &str = "0123456789abcdef";

/// Entropy source backed by the operating system.
pub struct OsEntropy;

impl RngCore for OsEntropy {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        getrandom::getrandom(&mut bytes).expect("Failed to generate random bytes");
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        getrandom::getrandom(&mut bytes).expect("Failed to generate random bytes");
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        getrandom::getrandom(dest).expect("Failed to generate random bytes");
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        getrandom::getrandom(dest).map_err(|_| Error::new("Failed to generate random bytes"))
    }
}

fn sample(alphabet: &str, len: usize) -> String {
    let chars = alphabet.as_bytes();
    let mut rng = OsEntropy;
    (0..len)
        .map(|_| chars[rng.gen_range(0..chars.len())] as char)
        .collect()
}

/// Generates a 44-character address drawn uniformly from [`ADDRESS_ALPHABET`].
pub fn generate_address() -> String {
    sample(ADDRESS_ALPHABET, ADDRESS_LEN)
}

/// Generates a 128-character lowercase hex signature.
pub fn generate_signature() -> String {
    sample(HEX_ALPHABET, SIGNATURE_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_length_and_alphabet() {
        for _ in 0..32 {
            let addr = generate_address();
            assert_eq!(addr.len(), ADDRESS_LEN);
            assert!(addr.chars().all(|c| ADDRESS_ALPHABET.contains(c)));
        }
    }

    #[test]
    fn test_address_excludes_ambiguous_characters() {
        assert_eq!(ADDRESS_ALPHABET.len(), 58);
        for c in ['0', 'O', 'I', 'l'] {
            assert!(!ADDRESS_ALPHABET.contains(c));
        }
    }

    #[test]
    fn test_signature_is_lowercase_hex() {
        for _ in 0..32 {
            let sig = generate_signature();
            assert_eq!(sig.len(), SIGNATURE_LEN);
            assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_consecutive_outputs_differ() {
        // 128 hex chars of entropy colliding back-to-back would point at a
        // broken source, not bad luck.
        assert_ne!(generate_signature(), generate_signature());
        assert_ne!(generate_address(), generate_address());
    }
}

//! Hashing and short identifier helpers.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Alphabet for short identifiers: digits and letters minus the visually
/// ambiguous `0`, `1`, `I`, `O` and `l`.
pub const SHORT_ID_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of a short identifier; enough base-57 digits to hold 128 bits.
pub const SHORT_ID_LENGTH: usize = 22;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Encodes a UUID as a fixed-length base-57 string.
pub fn encode_short_id(uuid: Uuid) -> String {
    let base = SHORT_ID_ALPHABET.len() as u128;
    let mut value = uuid.as_u128();
    let mut digits = [SHORT_ID_ALPHABET[0]; SHORT_ID_LENGTH];

    for slot in digits.iter_mut().rev() {
        *slot = SHORT_ID_ALPHABET[(value % base) as usize];
        value /= base;
    }

    digits.iter().map(|&b| b as char).collect()
}

/// Generates a random short identifier from a v4 UUID.
pub fn short_uuid() -> String {
    encode_short_id(Uuid::new_v4())
}

/// Returns true if `candidate` looks like a value produced by [`short_uuid`].
pub fn is_short_id(candidate: &str) -> bool {
    candidate.len() == SHORT_ID_LENGTH && candidate.bytes().all(|b| SHORT_ID_ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex("test");
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_empty_string() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_alphabet_has_no_ambiguous_characters() {
        assert_eq!(SHORT_ID_ALPHABET.len(), 57);
        for c in [b'0', b'1', b'I', b'O', b'l'] {
            assert!(!SHORT_ID_ALPHABET.contains(&c));
        }
    }

    #[test]
    fn test_encode_short_id_nil_and_max() {
        assert_eq!(encode_short_id(Uuid::nil()), "2".repeat(SHORT_ID_LENGTH));
        let max = encode_short_id(Uuid::from_u128(u128::MAX));
        assert_eq!(max.len(), SHORT_ID_LENGTH);
        assert!(is_short_id(&max));
    }

    #[test]
    fn test_encode_short_id_is_deterministic() {
        let uuid = Uuid::new_v4();
        assert_eq!(encode_short_id(uuid), encode_short_id(uuid));
    }

    #[test]
    fn test_short_uuid_shape_and_spread() {
        let ids: std::collections::HashSet<String> = (0..200).map(|_| short_uuid()).collect();
        assert_eq!(ids.len(), 200);
        assert!(ids.iter().all(|id| is_short_id(id)));
    }

    #[test]
    fn test_is_short_id_rejects_bad_input() {
        assert!(!is_short_id(""));
        assert!(!is_short_id("too-short"));
        assert!(!is_short_id(&"0".repeat(SHORT_ID_LENGTH)));
    }
}

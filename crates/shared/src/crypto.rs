//! Cryptographic utilities for QR token generation and hashing.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes in a QR token (before encoding).
const QR_TOKEN_BYTES: usize = 18;

/// Prefix for member QR tokens, so scans of unrelated codes are
/// rejected cheaply before a database lookup.
pub const QR_TOKEN_PREFIX: &str = "fm_";

/// Computes SHA-256 of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates an opaque, URL-safe QR token for a member.
///
/// The token is stored on the member row and embedded in the printed /
/// displayed QR code; it carries no structure beyond the prefix.
pub fn generate_qr_token() -> String {
    let mut bytes = [0u8; QR_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{}{}", QR_TOKEN_PREFIX, URL_SAFE_NO_PAD.encode(bytes))
}

/// Returns true if the string has the shape of a member QR token.
pub fn looks_like_qr_token(value: &str) -> bool {
    value.starts_with(QR_TOKEN_PREFIX) && value.len() > QR_TOKEN_PREFIX.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex("test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        assert_eq!(sha256_hex("same_input"), sha256_hex("same_input"));
        assert_ne!(sha256_hex("input1"), sha256_hex("input2"));
    }

    #[test]
    fn test_generate_qr_token_shape() {
        let token = generate_qr_token();
        assert!(token.starts_with(QR_TOKEN_PREFIX));
        // 18 bytes -> 24 base64url chars, no padding
        assert_eq!(token.len(), QR_TOKEN_PREFIX.len() + 24);
        assert!(looks_like_qr_token(&token));
    }

    #[test]
    fn test_generate_qr_token_unique() {
        let a = generate_qr_token();
        let b = generate_qr_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_looks_like_qr_token_rejects_other_strings() {
        assert!(!looks_like_qr_token("ABC123"));
        assert!(!looks_like_qr_token("fm_"));
        assert!(!looks_like_qr_token(""));
        assert!(!looks_like_qr_token("FM_abcdef"));
    }
}

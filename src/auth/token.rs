//! Opaque bearer tokens.
//!
//! The client holds the raw token; the sessions table only ever stores its
//! SHA-256 digest, so a leaked database does not leak usable credentials.

use sha2::{Digest, Sha256};

/// Length of a raw token in characters
const TOKEN_LENGTH: usize = 48;

/// Generate a new random token
pub fn generate_token() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    (0..TOKEN_LENGTH)
        .map(|_| {
            let idx: u8 = rng.random_range(0..62);
            match idx {
                0..=9 => (b'0' + idx) as char,
                10..=35 => (b'a' + idx - 10) as char,
                _ => (b'A' + idx - 36) as char,
            }
        })
        .collect()
}

/// Digest a raw token for storage or lookup
pub fn digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

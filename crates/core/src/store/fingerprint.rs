//! Content fingerprints used as the dedup and identity key.

use sha2::{Digest, Sha256};

/// Hex characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 12;

/// Compute the fingerprint of a record's `content + url`.
///
/// The two inputs are concatenated without a separator, so the result is
/// order-sensitive. SHA-256 cannot fail here, so there is no degraded
/// timestamp-based fallback and dedup always holds.
pub fn fingerprint(content: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.update(url.as_bytes());
    let mut hex = hex::encode(hasher.finalize());
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Whether `value` has the shape of a stored fingerprint.
pub fn is_fingerprint(value: &str) -> bool {
    value.len() == FINGERPRINT_LEN && value.chars().all(|c| c.is_ascii_hexdigit())
}

//! Content fingerprinting for change detection.
//!
//! A fingerprint is the SHA-256 digest of the raw file bytes plus the byte
//! count. Hashing bytes (not decoded text) keeps the fingerprint stable
//! across platforms and encodings: the push planner compares fingerprints,
//! never content.

use sha2::{Digest, Sha256};

/// Compute the content fingerprint of a byte slice.
///
/// Returns the lowercase hex SHA-256 digest and the length in bytes.
/// Deterministic and side-effect free.
#[must_use]
pub fn fingerprint(bytes: &[u8]) -> (String, u64) {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    (format!("{:x}", hasher.finalize()), bytes.len() as u64)
}

/// Check whether content changed relative to a recorded hash.
///
/// Returns `true` when there is no recorded hash (never pushed) or the
/// hashes differ.
#[must_use]
pub fn has_changed(current_hash: &str, recorded_hash: Option<&str>) -> bool {
    recorded_hash != Some(current_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_deterministic() {
        let (h1, s1) = fingerprint(b"fn main() {}\n");
        let (h2, s2) = fingerprint(b"fn main() {}\n");
        assert_eq!(h1, h2);
        assert_eq!(s1, s2);
        assert_eq!(h1.len(), 64); // SHA-256 produces 64 hex chars
        assert_eq!(s1, 13);
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let (h1, _) = fingerprint(b"a");
        let (h2, _) = fingerprint(b"b");
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_fingerprint_of_empty() {
        let (hash, size) = fingerprint(b"");
        assert_eq!(size, 0);
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_has_changed() {
        assert!(has_changed("abc", None));
        assert!(has_changed("abc", Some("def")));
        assert!(!has_changed("abc", Some("abc")));
    }
}

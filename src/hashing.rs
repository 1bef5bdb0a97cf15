//! Hashing System - SHA-256 Fingerprints
//!
//! Identical documents always produce identical programs; the fingerprints
//! recorded in the diagnostic log make that checkable across runs.

use sha2::{Digest, Sha256};

use crate::document::Document;

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Fingerprint a document by its normalized lines, so line terminator
/// style does not change the hash.
pub fn fingerprint_document(document: &Document) -> String {
    let mut hasher = Sha256::new();
    for line in document.lines() {
        hasher.update(line);
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

// We need hex encoding
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let data = b"test data";
        assert_eq!(sha256_hex(data), sha256_hex(data));
        assert_eq!(sha256_hex(data).len(), 64);
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_fingerprint_ignores_terminator_style() {
        let unix = Document::parse("a\nb\n");
        let dos = Document::parse("a\r\nb\r\n");
        assert_eq!(fingerprint_document(&unix), fingerprint_document(&dos));
        assert_ne!(fingerprint_document(&unix), fingerprint_document(&Document::parse("a\nc\n")));
    }
}

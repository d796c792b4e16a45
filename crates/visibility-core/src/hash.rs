//! Evidence content hashing.
//!
//! The Validator's `evidence_present` check (`spec.md` §4.5) and the
//! round-trip law in `spec.md` §8 ("`verifyHash(x, hashContent(x)) = true`
//! for any byte sequence `x`") both need a stable way to fingerprint
//! archived evidence (response bodies, screenshots, HTML captures). SHA-256
//! is the obvious choice and matches the `sha2` dependency already used
//! elsewhere in the surrounding example pack.

use sha2::{Digest, Sha256};
use std::fmt;

/// A SHA-256 content fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Returns the raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Renders the digest as lowercase hex.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Computes the content hash of an arbitrary byte sequence.
pub fn hash_content(bytes: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    ContentHash(out)
}

/// Verifies that `bytes` hashes to `expected`.
pub fn verify_hash(bytes: &[u8], expected: &ContentHash) -> bool {
    hash_content(bytes) == *expected
}

//! Rule fingerprints.

use sha2::{Digest, Sha256};

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 64;

/// Compute the dedup key of a rule: SHA-256 of the trimmed text as lowercase hex.
///
/// Callers normalise whitespace once, before hashing; trimming here only
/// guards against stray line endings.
pub fn fingerprint(raw: &str) -> String {
    let digest = Sha256::digest(raw.trim().as_bytes());
    format!("{:x}", digest)
}

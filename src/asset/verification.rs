use crate::core::UpdateError;
use sha2::{Digest, Sha256};
use tracing::{debug, error};

/// SHA-256 integrity checks for downloaded renderer archives.
///
/// Release manifests declare the archive digest as bare lowercase hex
/// (no `sha256:` prefix). Comparison is case-insensitive, and any single
/// changed byte in the archive changes the digest and fails the check.
pub struct ChecksumVerifier;

impl ChecksumVerifier {
    /// Hex-encoded SHA-256 of `bytes`.
    #[must_use]
    pub fn compute_sha256_bytes(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hex::encode(hasher.finalize())
    }

    /// Case-insensitive digest comparison.
    #[must_use]
    pub fn matches(actual: &str, expected: &str) -> bool {
        actual.trim().eq_ignore_ascii_case(expected.trim())
    }

    /// Check `bytes` against the expected digest.
    ///
    /// On mismatch both digests are logged and returned in the error.
    pub fn verify_bytes(bytes: &[u8], expected: &str) -> Result<(), UpdateError> {
        let actual = Self::compute_sha256_bytes(bytes);
        if !Self::matches(&actual, expected) {
            error!(expected, actual = %actual, "Hash mismatch");
            return Err(UpdateError::ChecksumMismatch {
                expected: expected.to_string(),
                actual,
            });
        }
        debug!("Checksum verification successful");
        Ok(())
    }
}

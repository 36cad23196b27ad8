//! Shared-secret comparison for the cleanup trigger
//!
//! Both sides are hashed before comparing so the comparison is
//! constant-time and independent of either length.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Whether `provided` matches `expected`, in constant time
#[must_use]
pub fn secret_matches(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided.as_slice().ct_eq(expected.as_slice()).into()
}

//! # SHA-256 Hashing
//!
//! One-shot helpers over `sha2`.

use sha2::{Digest, Sha256};

/// SHA-256 output (256-bit).
pub type Digest32 = [u8; 32];

/// Hash data with SHA-256.
pub fn sha256(data: &[u8]) -> Digest32 {
    Sha256::digest(data).into()
}

//! # Canonical Encoding
//!
//! JSON with struct-declared field order. Signing and hashing always go
//! through here so every peer produces the same bytes for the same value.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::{Hash, TypesError, TypesResult};

/// Serialize `value` into its canonical byte form.
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> TypesResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| TypesError::Encoding(e.to_string()))
}

/// SHA-256 of the canonical bytes of `value`.
pub fn canonical_hash<T: Serialize + ?Sized>(value: &T) -> TypesResult<Hash> {
    Ok(Sha256::digest(canonical_bytes(value)?).into())
}

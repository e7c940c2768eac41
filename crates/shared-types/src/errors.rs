//! # Error Types
//!
//! Errors raised while decoding keys or producing canonical bytes.

use thiserror::Error;

/// Errors that can occur when handling shared entities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypesError {
    /// The account key is not lowercase hex of a 32-byte public key.
    #[error("Invalid account key: {0}")]
    InvalidAccountKey(String),

    /// A value could not be turned into its canonical byte form.
    #[error("Encoding failed: {0}")]
    Encoding(String),
}

/// Result alias for shared-type operations.
pub type TypesResult<T> = Result<T, TypesError>;

//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed (wrong passphrase or tampered data)
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid signature format
    #[error("Invalid signature format: expected {expected} bytes, got {actual}")]
    InvalidSignatureFormat {
        /// Expected signature length in bytes
        expected: usize,
        /// Actual signature length in bytes
        actual: usize,
    },

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Passphrase could not be stretched into a key
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// Malformed key file
    #[error("Malformed key file: {0}")]
    MalformedKeyFile(String),

    /// Filesystem error while reading or writing a key file
    #[error("Key file I/O: {0}")]
    Io(#[from] std::io::Error),
}

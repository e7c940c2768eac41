//! # Shared Crypto - Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `signatures` | Ed25519 | Transaction, block and lottery signatures |
//! | `hashing` | SHA-256 | Tree addressing, flood digests, lottery values |
//! | `symmetric` | XChaCha20-Poly1305, Argon2id | Signing key at rest |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, so a signature over a fixed message is
//!   a fixed value. Lottery draws rely on this.
//! - **XChaCha20**: 192-bit random nonce per file, authenticated.
//! - **Argon2id**: memory-hard passphrase stretching with a random salt per
//!   file.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;
pub mod symmetric;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{sha256, Digest32};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use symmetric::{
    decrypt, decrypt_from_file, derive_key, encrypt, encrypt_to_file, Nonce, SecretKey,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

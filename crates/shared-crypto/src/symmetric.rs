//! # Symmetric Encryption
//!
//! XChaCha20-Poly1305 for secrets kept on disk, keyed by Argon2id over a
//! passphrase. Only the node's signing seed is stored this way; nothing
//! consensus-related is ever encrypted.
//!
//! ## Key File Layout
//!
//! ```text
//! | salt (16) | nonce (24) | ciphertext + tag |
//! ```

use std::fs;
use std::path::Path;

use crate::CryptoError;
use argon2::Argon2;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use zeroize::Zeroize;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 24;

/// Secret key (256-bit).
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Generate random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Nonce for encryption.
#[derive(Clone)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Generate random nonce (safe with XChaCha20's 192-bit nonce).
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

/// Stretch a passphrase into a key with Argon2id (default parameters).
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if the salt is shorter than Argon2
/// accepts.
pub fn derive_key(passphrase: &[u8], salt: &[u8]) -> Result<SecretKey, CryptoError> {
    let mut bytes = [0u8; 32];
    Argon2::default()
        .hash_password_into(passphrase, salt, &mut bytes)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    let key = SecretKey::from_bytes(bytes);
    bytes.zeroize();
    Ok(key)
}

/// Encrypt plaintext with XChaCha20-Poly1305.
///
/// Returns (ciphertext, nonce).
///
/// # Errors
///
/// Returns `CryptoError::EncryptionFailed` if encryption fails.
pub fn encrypt(key: &SecretKey, plaintext: &[u8]) -> Result<(Vec<u8>, Nonce), CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let nonce = Nonce::generate();

    let ciphertext = cipher
        .encrypt(XNonce::from_slice(nonce.as_bytes()), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    Ok((ciphertext, nonce))
}

/// Decrypt ciphertext with XChaCha20-Poly1305.
///
/// # Errors
///
/// Returns `CryptoError::DecryptionFailed` if the key is wrong or the data
/// was tampered with.
pub fn decrypt(key: &SecretKey, ciphertext: &[u8], nonce: &Nonce) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

    cipher
        .decrypt(XNonce::from_slice(nonce.as_bytes()), ciphertext)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

/// Encrypt `plaintext` under `passphrase` and write it to `path`.
pub fn encrypt_to_file(
    path: impl AsRef<Path>,
    passphrase: &[u8],
    plaintext: &[u8],
) -> Result<(), CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut salt);
    let key = derive_key(passphrase, &salt)?;
    let (ciphertext, nonce) = encrypt(&key, plaintext)?;

    let mut out = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(nonce.as_bytes());
    out.extend_from_slice(&ciphertext);
    fs::write(path, out)?;
    Ok(())
}

/// Read and decrypt a file written by [`encrypt_to_file`].
pub fn decrypt_from_file(
    path: impl AsRef<Path>,
    passphrase: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let data = fs::read(path)?;
    if data.len() < SALT_LEN + NONCE_LEN {
        return Err(CryptoError::MalformedKeyFile(format!(
            "{} bytes is shorter than the header",
            data.len()
        )));
    }
    let (salt, rest) = data.split_at(SALT_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(nonce);

    let key = derive_key(passphrase, salt)?;
    decrypt(&key, ciphertext, &Nonce::from_bytes(nonce_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_key_fails() {
        let key1 = SecretKey::generate();
        let key2 = SecretKey::generate();

        let (ciphertext, nonce) = encrypt(&key1, b"seed").unwrap();
        assert!(decrypt(&key2, &ciphertext, &nonce).is_err());
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = SecretKey::generate();
        let (mut ciphertext, nonce) = encrypt(&key, b"seed").unwrap();
        ciphertext[0] ^= 0xFF;
        assert!(decrypt(&key, &ciphertext, &nonce).is_err());
    }

    #[test]
    fn test_derive_key_depends_on_salt() {
        let a = derive_key(b"hunter2", &[1u8; SALT_LEN]).unwrap();
        let b = derive_key(b"hunter2", &[2u8; SALT_LEN]).unwrap();
        let again = derive_key(b"hunter2", &[1u8; SALT_LEN]).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
        assert_eq!(a.as_bytes(), again.as_bytes());
    }

    #[test]
    fn test_derive_key_rejects_short_salt() {
        assert!(matches!(
            derive_key(b"hunter2", b"salt"),
            Err(CryptoError::KeyDerivation(_))
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.key");

        encrypt_to_file(&path, b"passphrase", &[9u8; 32]).unwrap();
        let restored = decrypt_from_file(&path, b"passphrase").unwrap();
        assert_eq!(restored, vec![9u8; 32]);
    }

    #[test]
    fn test_file_wrong_passphrase() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.key");

        encrypt_to_file(&path, b"right", b"secret").unwrap();
        assert!(matches!(
            decrypt_from_file(&path, b"wrong"),
            Err(CryptoError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn test_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.key");
        std::fs::write(&path, [0u8; 8]).unwrap();
        assert!(matches!(
            decrypt_from_file(&path, b"x"),
            Err(CryptoError::MalformedKeyFile(_))
        ));
    }
}

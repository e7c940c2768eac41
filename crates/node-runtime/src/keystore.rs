//! Signing key persistence.
//!
//! The 32-byte Ed25519 seed is stored encrypted under a passphrase
//! (XChaCha20-Poly1305, see [`shared_crypto::symmetric`]).

use std::path::Path;

use shared_crypto::{decrypt_from_file, encrypt_to_file, CryptoError, Ed25519KeyPair};
use tracing::info;
use zeroize::Zeroizing;

use crate::errors::NodeResult;

/// Load the key at `path`, or create and store a fresh one if the file does
/// not exist yet.
pub fn load_or_create(path: &Path, passphrase: &str) -> NodeResult<Ed25519KeyPair> {
    if path.exists() {
        let keypair = load(path, passphrase)?;
        info!(path = %path.display(), "loaded signing key");
        Ok(keypair)
    } else {
        let keypair = Ed25519KeyPair::generate();
        store(path, passphrase, &keypair)?;
        info!(path = %path.display(), "generated new signing key");
        Ok(keypair)
    }
}

pub fn load(path: &Path, passphrase: &str) -> NodeResult<Ed25519KeyPair> {
    let seed = Zeroizing::new(decrypt_from_file(path, passphrase.as_bytes())?);
    let seed: [u8; 32] = seed.as_slice().try_into().map_err(|_| {
        CryptoError::MalformedKeyFile(format!("seed is {} bytes, expected 32", seed.len()))
    })?;
    let seed = Zeroizing::new(seed);
    Ok(Ed25519KeyPair::from_seed(*seed))
}

pub fn store(path: &Path, passphrase: &str, keypair: &Ed25519KeyPair) -> NodeResult<()> {
    let seed = Zeroizing::new(keypair.to_seed());
    encrypt_to_file(path, passphrase.as_bytes(), seed.as_slice())?;
    Ok(())
}

//! Driven ports (Outbound dependencies)

use shared_types::AccountKey;

/// The local signing key.
///
/// Signatures must be deterministic: signing the same message twice yields
/// the same bytes, otherwise a peer could re-roll its draw.
pub trait DrawSigner: Send + Sync {
    /// Account whose stake backs the draws.
    fn account(&self) -> AccountKey;

    fn sign(&self, message: &[u8]) -> Vec<u8>;
}

/// Signature verification against an encoded public key.
pub trait SignatureVerifier: Send + Sync {
    /// `false` for a malformed key or signature as well as a wrong one.
    fn verify(&self, key: &AccountKey, message: &[u8], signature: &[u8]) -> bool;
}

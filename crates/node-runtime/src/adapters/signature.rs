//! Ed25519 signing and verification for sortition and transactions.

use sc_03_sortition::{DrawSigner, SignatureVerifier};
use shared_crypto::{Ed25519KeyPair, Ed25519PublicKey};
use shared_types::{AccountKey, SignedTransaction, Transaction};

use crate::errors::NodeResult;

/// The node's signing key.
pub struct KeySigner {
    keypair: Ed25519KeyPair,
    account: AccountKey,
}

impl KeySigner {
    pub fn new(keypair: Ed25519KeyPair) -> Self {
        let account = AccountKey::from_bytes(keypair.public_key().as_bytes());
        Self { keypair, account }
    }

    pub fn account_key(&self) -> &AccountKey {
        &self.account
    }

    /// Sign the canonical bytes of `transaction`.
    pub fn sign_transaction(&self, transaction: Transaction) -> NodeResult<SignedTransaction> {
        let signature = self.keypair.sign(&transaction.signing_bytes()?).to_vec();
        Ok(SignedTransaction {
            transaction,
            signature,
        })
    }
}

impl DrawSigner for KeySigner {
    fn account(&self) -> AccountKey {
        self.account.clone()
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.keypair.sign(message).to_vec()
    }
}

impl std::fmt::Debug for KeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySigner")
            .field("account", &self.account.short())
            .finish_non_exhaustive()
    }
}

/// Verifies Ed25519 signatures against hex-encoded account keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl Ed25519Verifier {
    /// Whether `signed` carries a valid signature by its sender.
    pub fn verify_transaction(&self, signed: &SignedTransaction) -> bool {
        match signed.transaction.signing_bytes() {
            Ok(message) => self.verify(&signed.transaction.from, &message, &signed.signature),
            Err(_) => false,
        }
    }
}

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, key: &AccountKey, message: &[u8], signature: &[u8]) -> bool {
        let Ok(raw) = key.to_bytes() else {
            return false;
        };
        let Ok(public_key) = Ed25519PublicKey::from_bytes(raw) else {
            return false;
        };
        public_key.verify_slice(message, signature).is_ok()
    }
}

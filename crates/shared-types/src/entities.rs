//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Accounts**: [`AccountKey`]
//! - **Chain**: [`Transaction`], [`SignedTransaction`], [`Block`], [`Genesis`]
//! - **Networking**: [`PeerInfo`]

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

use crate::{canonical_bytes, TypesError, TypesResult};

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// The all-zero hash, used as the parent of genesis.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Balance credited to every stakeholder named in the genesis message.
pub const GENESIS_ENDOWMENT: u64 = 1_000_000;

/// Fixed part of the proposer reward; one more unit is paid per transaction.
pub const BASE_BLOCK_REWARD: u64 = 10;

/// Render the first `n` bytes of a hash as hex, for log lines and dumps.
pub fn short_hash(hash: &Hash, n: usize) -> String {
    hex::encode(&hash[..n.min(hash.len())])
}

// =============================================================================
// ACCOUNTS
// =============================================================================

/// Encoded public key that addresses a ledger account.
///
/// The encoding is the lowercase hex of the 32-byte Ed25519 verifying key,
/// which is deterministic and invertible through [`AccountKey::to_bytes`].
/// Deserialization goes through [`AccountKey::parse`], so every key in the
/// system has that shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountKey(String);

impl AccountKey {
    /// Encode a raw public key.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Parse an encoded key, validating its shape.
    pub fn parse(encoded: &str) -> TypesResult<Self> {
        let key = Self(encoded.to_ascii_lowercase());
        key.to_bytes()?;
        Ok(key)
    }

    /// Decode back into the raw public key.
    pub fn to_bytes(&self) -> TypesResult<[u8; 32]> {
        let raw =
            hex::decode(&self.0).map_err(|e| TypesError::InvalidAccountKey(e.to_string()))?;
        raw.try_into().map_err(|raw: Vec<u8>| {
            TypesError::InvalidAccountKey(format!("expected 32 bytes, got {}", raw.len()))
        })
    }

    /// The encoded form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for logs: the first 8 characters.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl TryFrom<String> for AccountKey {
    type Error = TypesError;

    fn try_from(encoded: String) -> TypesResult<Self> {
        Self::parse(&encoded)
    }
}

impl From<AccountKey> for String {
    fn from(key: AccountKey) -> Self {
        key.0
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// CHAIN
// =============================================================================

/// A value transfer between two accounts.
///
/// Identity is the `id`: two transactions with equal ids are the same event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier (UUID v4 when created locally).
    pub id: String,
    /// Sender account.
    pub from: AccountKey,
    /// Recipient account.
    pub to: AccountKey,
    /// Amount debited from the sender.
    pub amount: u64,
}

impl Transaction {
    /// Build a transaction with a fresh random id.
    pub fn new(from: AccountKey, to: AccountKey, amount: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            from,
            to,
            amount,
        }
    }

    /// Bytes the sender signs.
    pub fn signing_bytes(&self) -> TypesResult<Vec<u8>> {
        canonical_bytes(self)
    }
}

/// A transaction plus the sender's signature over [`Transaction::signing_bytes`].
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    #[serde_as(as = "Hex")]
    pub signature: Vec<u8>,
}

/// A proposed block as it travels over the wire.
///
/// Transactions are referenced by id; peers resolve them against the
/// transactions they have already received.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Ordered transaction ids.
    pub transactions: Vec<String>,
    /// Account of the slot winner that built the block.
    pub proposer: AccountKey,
    /// Slot of the parent tree node.
    pub parent_slot: u64,
    /// Content hash of the parent tree node.
    #[serde_as(as = "Hex")]
    pub parent_hash: Hash,
    /// Slot this block was proposed in.
    pub slot: u64,
    /// Proposer's lottery draw for `slot`.
    #[serde_as(as = "Hex")]
    pub draw: Vec<u8>,
    /// Proposer's signature over `(parent_hash, transactions)`.
    #[serde_as(as = "Hex")]
    pub signature: Vec<u8>,
}

/// The message that starts the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    /// Accounts endowed with [`GENESIS_ENDOWMENT`].
    pub stakeholders: Vec<AccountKey>,
    /// Seed mixed into every lottery draw.
    pub seed: u64,
}

// =============================================================================
// NETWORKING
// =============================================================================

/// A peer's self-announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    /// Human-readable name, bijective with `public_key` in every ledger.
    pub alias: String,
    /// Address the peer accepts connections on.
    pub address: String,
    /// The peer's account key.
    pub public_key: AccountKey,
}

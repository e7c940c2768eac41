//! Tree node payloads.

use serde::Serialize;
use shared_types::{canonical_hash, AccountKey, Hash, TypesResult, ZERO_HASH};

/// Index of a node in the tree arena. Stable for the tree's lifetime.
pub type NodeIndex = usize;

/// The content of one chain position.
///
/// The node hash is the SHA-256 of this value's canonical encoding, so two
/// siblings differing in proposer or transactions are distinct forks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainEntry {
    pub slot: u64,
    /// Depth from genesis (genesis is 0).
    pub length: u64,
    pub parent_hash: Hash,
    pub proposer: Option<AccountKey>,
    pub transactions: Vec<String>,
}

impl ChainEntry {
    pub fn genesis() -> Self {
        Self {
            slot: 0,
            length: 0,
            parent_hash: ZERO_HASH,
            proposer: None,
            transactions: Vec::new(),
        }
    }

    pub fn content_hash(&self) -> TypesResult<Hash> {
        canonical_hash(self)
    }
}

/// Arena node: an entry, its hash and its links.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub entry: ChainEntry,
    pub hash: Hash,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
}

impl TreeNode {
    pub fn slot(&self) -> u64 {
        self.entry.slot
    }

    pub fn length(&self) -> u64 {
        self.entry.length
    }
}

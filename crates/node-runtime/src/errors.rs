//! Node-level error type.

use sc_01_ledger::LedgerError;
use sc_02_fork_choice::ForkChoiceError;
use sc_03_sortition::SortitionError;
use sc_04_gossip::GossipError;
use shared_crypto::CryptoError;
use shared_types::TypesError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Unknown alias: {0}")]
    UnknownAlias(String),

    #[error("Transaction signature does not verify")]
    InvalidTransactionSignature,

    #[error("Genesis has already been initialized")]
    GenesisAlreadyInitialized,

    #[error("Genesis has not been received yet")]
    GenesisNotInitialized,

    #[error("Bootstrap peer did not answer within {0:?}")]
    BootstrapTimeout(std::time::Duration),

    #[error("Node is shut down")]
    ShutDown,

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Fork choice error: {0}")]
    ForkChoice(#[from] ForkChoiceError),

    #[error("Sortition error: {0}")]
    Sortition(#[from] SortitionError),

    #[error("Gossip error: {0}")]
    Gossip(#[from] GossipError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Encoding error: {0}")]
    Types(#[from] TypesError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NodeResult<T> = Result<T, NodeError>;

impl NodeError {
    /// Short label for the `reason` dimension of rejection metrics.
    pub fn rejection_reason(&self) -> &'static str {
        match self {
            NodeError::Sortition(SortitionError::InvalidDraw { .. }) => "draw",
            NodeError::Sortition(SortitionError::InvalidBlockSignature) => "signature",
            NodeError::Sortition(SortitionError::BelowHardness { .. }) => "hardness",
            NodeError::ForkChoice(ForkChoiceError::DuplicateBlock(_)) => "duplicate",
            NodeError::ForkChoice(ForkChoiceError::InvalidSlot { .. }) => "slot",
            _ => "other",
        }
    }
}

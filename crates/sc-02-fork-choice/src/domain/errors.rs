use shared_types::{short_hash, Hash};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForkChoiceError {
    #[error("Unknown parent {} at slot {parent_slot}", short_hash(.parent_hash, 8))]
    UnknownParent { parent_slot: u64, parent_hash: Hash },

    #[error("Block already in tree: {}", short_hash(.0, 8))]
    DuplicateBlock(Hash),

    #[error("Slot {slot} does not advance past tip slot {tip_slot}")]
    StaleSlot { slot: u64, tip_slot: u64 },

    #[error("Slot {slot} does not follow parent slot {parent_slot}")]
    InvalidSlot { slot: u64, parent_slot: u64 },

    #[error("Unknown node {}", short_hash(.0, 8))]
    UnknownNode(Hash),

    #[error("Encoding failed: {0}")]
    Encoding(String),
}

pub type ForkChoiceResult<T> = Result<T, ForkChoiceError>;

impl From<shared_types::TypesError> for ForkChoiceError {
    fn from(err: shared_types::TypesError) -> Self {
        ForkChoiceError::Encoding(err.to_string())
    }
}

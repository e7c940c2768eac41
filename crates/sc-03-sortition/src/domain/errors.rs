use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SortitionError {
    #[error("Draw for slot {slot} is not a valid proposer signature")]
    InvalidDraw { slot: u64 },

    #[error("Block signature does not verify")]
    InvalidBlockSignature,

    #[error("Draw for slot {slot} does not clear the hardness threshold")]
    BelowHardness { slot: u64 },

    #[error("Encoding failed: {0}")]
    Encoding(String),
}

pub type SortitionResult<T> = Result<T, SortitionError>;

impl From<shared_types::TypesError> for SortitionError {
    fn from(err: shared_types::TypesError) -> Self {
        SortitionError::Encoding(err.to_string())
    }
}

use thiserror::Error;

/// Reasons a transfer or its reversal is refused. None of them change state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Transaction already applied: {0}")]
    AlreadyApplied(String),

    #[error("Transaction {id} has non-positive amount")]
    NonPositiveAmount { id: String },

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("Transaction not applied: {0}")]
    NotApplied(String),

    #[error("Balance overflow crediting {0}")]
    Overflow(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

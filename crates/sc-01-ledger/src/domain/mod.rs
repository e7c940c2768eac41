//! Domain layer for the ledger

mod aliases;
mod errors;
mod ledger;

pub use aliases::*;
pub use errors::*;
pub use ledger::*;

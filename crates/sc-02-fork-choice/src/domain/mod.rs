//! Domain layer for fork choice

mod entry;
mod errors;
mod orphans;
mod tree;

pub use entry::*;
pub use errors::*;
pub use orphans::*;
pub use tree::*;

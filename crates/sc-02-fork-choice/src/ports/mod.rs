//! Ports for the fork-choice tree

mod outbound;

pub use outbound::*;

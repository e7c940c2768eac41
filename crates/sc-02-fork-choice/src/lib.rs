//! # sc-02-fork-choice
//!
//! Every chain position seen so far, the canonical tip, and the ledger replay
//! that follows the tip around.
//!
//! ## Fork Choice
//!
//! After each insert the new node is compared with the current tip:
//!
//! - longer than the best known length: switch to it
//! - equal length: switch only if its content hash is greater (byte-wise)
//! - shorter: keep the tip
//!
//! The tie-break compares only the two frontier nodes, so it is deterministic
//! across peers without being a total order over whole chains.
//!
//! ## Tip Switch
//!
//! ```text
//!            lca
//!           /   \
//!        undo   apply
//!         |       |
//!      current  target
//! ```
//!
//! Nodes from `current` up to (not including) the lowest common ancestor are
//! undone tip-first; nodes from the ancestor down to `target` are applied
//! root-first. The [`StateTransition`] port receives each node's transaction
//! ids.
//!
//! ## Orphans
//!
//! Inserting a block whose parent is unknown is a recoverable
//! [`ForkChoiceError::UnknownParent`]. Callers park such blocks in an
//! [`OrphanBuffer`] and retry them as new nodes arrive.

pub mod domain;
pub mod ports;

pub use domain::*;
pub use ports::StateTransition;

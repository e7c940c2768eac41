//! Driven ports (Outbound dependencies)

use shared_types::Hash;

/// State that follows the canonical tip.
///
/// The tree calls `apply` when a node joins the canonical chain and `undo`
/// when it leaves it, passing the node's hash and transaction ids. An `undo`
/// for a node always follows an `apply` for the same node, and must exactly
/// reverse whatever that `apply` changed.
pub trait StateTransition {
    fn apply(&mut self, block: &Hash, transactions: &[String]);

    fn undo(&mut self, block: &Hash, transactions: &[String]);
}

/// No-op transition, for trees that only track shape.
impl StateTransition for () {
    fn apply(&mut self, _block: &Hash, _transactions: &[String]) {}

    fn undo(&mut self, _block: &Hash, _transactions: &[String]) {}
}

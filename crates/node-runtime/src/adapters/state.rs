//! # Ledger Transition Adapter
//!
//! Implements the fork tree's [`StateTransition`] port by resolving
//! transaction ids through the node's [`TransactionStore`] and applying them
//! to the [`Ledger`].
//!
//! Apply records, per tree node, the ids that actually took effect. Undo
//! reverses exactly those, newest first, so a block that repeats an id an
//! ancestor already applied never reverses the ancestor's transfer.

use std::collections::HashMap;
use std::sync::Arc;

use sc_01_ledger::Ledger;
use sc_02_fork_choice::StateTransition;
use shared_types::{short_hash, Hash, Transaction};
use tracing::{debug, warn};

use crate::node::TransactionStore;

pub struct LedgerTransition {
    ledger: Arc<Ledger>,
    store: Arc<TransactionStore>,
    effective: HashMap<Hash, Vec<Transaction>>,
}

impl LedgerTransition {
    pub fn new(ledger: Arc<Ledger>, store: Arc<TransactionStore>) -> Self {
        Self {
            ledger,
            store,
            effective: HashMap::new(),
        }
    }

    /// Ids from the block at `hash` that are currently applied.
    pub fn effective_ids(&self, hash: &Hash) -> Vec<String> {
        self.effective
            .get(hash)
            .map(|txs| txs.iter().map(|tx| tx.id.clone()).collect())
            .unwrap_or_default()
    }
}

impl StateTransition for LedgerTransition {
    fn apply(&mut self, block: &Hash, transactions: &[String]) {
        let mut applied = Vec::with_capacity(transactions.len());
        for id in transactions {
            let Some(tx) = self.store.get(id) else {
                warn!(block = %short_hash(block, 4), id, "unknown transaction in block, skipping");
                continue;
            };
            match self.ledger.apply_transaction(&tx) {
                Ok(()) => applied.push(tx),
                Err(e) => debug!(block = %short_hash(block, 4), id, error = %e, "skipping transaction"),
            }
        }
        self.effective.insert(*block, applied);
    }

    fn undo(&mut self, block: &Hash, _transactions: &[String]) {
        let Some(applied) = self.effective.remove(block) else {
            return;
        };
        for tx in applied.iter().rev() {
            if let Err(e) = self.ledger.reverse_transaction(tx) {
                warn!(block = %short_hash(block, 4), id = %tx.id, error = %e, "could not reverse transaction");
            }
        }
    }
}

//! Block acceptance, orphan parking and retry.

use sc_02_fork_choice::{Buffered, ForkChoiceError, InsertOutcome, Reorg};
use sc_03_sortition::{block_reward, verify_block};
use sc_telemetry::metrics::{
    BLOCKS_ACCEPTED, BLOCKS_DEFERRED, BLOCKS_REJECTED, CHAIN_LENGTH, REORGS,
};
use shared_types::{short_hash, Block};
use tracing::{debug, info, trace, warn};

use super::Node;
use crate::errors::NodeResult;

/// Why a verified block is waiting instead of being in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferral {
    /// No genesis yet, so there is no seed to verify the draw against.
    NoGenesis,
    /// The parent is not in the local tree.
    UnknownParent,
    /// Referenced transactions have not arrived.
    MissingTransactions(Vec<String>),
}

/// What became of a block.
#[derive(Debug, Clone)]
pub enum Placement {
    Inserted(InsertOutcome),
    Deferred(Deferral),
}

impl Node {
    /// Handle a block received from the network.
    ///
    /// Invalid blocks are dropped with an error. Valid blocks whose parent or
    /// transactions are missing are parked and retried as the node learns
    /// more.
    pub fn receive_block(&self, block: Block) -> NodeResult<Placement> {
        match self.place_block(&block) {
            Ok(Placement::Inserted(outcome)) => {
                self.retry_orphans();
                Ok(Placement::Inserted(outcome))
            }
            Ok(Placement::Deferred(reason)) => {
                self.park(block, &reason);
                Ok(Placement::Deferred(reason))
            }
            Err(e) => {
                BLOCKS_REJECTED
                    .with_label_values(&[e.rejection_reason()])
                    .inc();
                debug!(slot = block.slot, proposer = block.proposer.short(), error = %e, "dropping block");
                Err(e)
            }
        }
    }

    /// Verify and insert one block; no parking, no retry.
    fn place_block(&self, block: &Block) -> NodeResult<Placement> {
        let Some(lottery) = self.lottery.get() else {
            return Ok(Placement::Deferred(Deferral::NoGenesis));
        };
        let stake = self.ledger.balance(&block.proposer);
        verify_block(block, lottery.seed(), stake, &self.verifier)?;

        let missing = self.store.missing(&block.transactions);
        if !missing.is_empty() {
            return Ok(Placement::Deferred(Deferral::MissingTransactions(missing)));
        }

        let inserted = self.tree.lock().insert(
            block.slot,
            block.transactions.clone(),
            block.proposer.clone(),
            block.parent_slot,
            block.parent_hash,
        );
        let outcome = match inserted {
            Ok(outcome) => outcome,
            Err(ForkChoiceError::UnknownParent { .. }) => {
                return Ok(Placement::Deferred(Deferral::UnknownParent))
            }
            Err(e) => return Err(e.into()),
        };

        // Committed elsewhere; never re-proposed from here unless a reorg
        // abandons them.
        self.pending.remove_all(&block.transactions);
        self.sync_pending(&outcome.reorg);
        self.credit_reward(&block);

        BLOCKS_ACCEPTED.inc();
        CHAIN_LENGTH.set(self.chain_length() as i64);
        if !outcome.reorg.undone.is_empty() {
            REORGS.inc();
            info!(
                undone = outcome.reorg.undone.len(),
                applied = outcome.reorg.applied.len(),
                tip = %short_hash(&outcome.hash, 4),
                "reorganized"
            );
        }
        debug!(
            slot = block.slot,
            proposer = block.proposer.short(),
            hash = %short_hash(&outcome.hash, 4),
            decision = ?outcome.decision,
            "accepted block"
        );
        Ok(Placement::Inserted(outcome))
    }

    /// Pay the proposer of an accepted block. Rewards stay across reorgs.
    pub(super) fn credit_reward(&self, block: &Block) {
        let reward = block_reward(block.transactions.len());
        if let Err(e) = self.ledger.add_money(&block.proposer, reward) {
            warn!(
                slot = block.slot,
                proposer = block.proposer.short(),
                error = %e,
                "block reward refused"
            );
        }
    }

    /// Follow a tip switch in the pending queue: ids that joined the
    /// canonical chain leave it, ids that fell off come back.
    fn sync_pending(&self, reorg: &Reorg) {
        if reorg.is_empty() {
            return;
        }
        let committed: Vec<String> = reorg
            .applied
            .iter()
            .flat_map(|step| step.transactions.iter().cloned())
            .collect();
        self.pending.remove_all(&committed);

        let abandoned: Vec<String> = reorg
            .abandoned_transactions()
            .into_iter()
            .filter(|id| !self.ledger.is_applied(id))
            .collect();
        if !abandoned.is_empty() {
            debug!(count = abandoned.len(), "requeued abandoned transactions");
            self.pending.extend(abandoned);
        }
    }

    fn park(&self, block: Block, reason: &Deferral) {
        let slot = block.slot;
        let pushed = self.orphans.lock().push(slot, block);
        match pushed {
            Buffered::Stored => {
                BLOCKS_DEFERRED.inc();
                debug!(slot, ?reason, "parked block");
            }
            Buffered::StoredEvicting(evicted) => {
                BLOCKS_DEFERRED.inc();
                BLOCKS_REJECTED.with_label_values(&["evicted"]).inc();
                warn!(slot, evicted_slot = evicted.slot, "orphan buffer full, evicted oldest block");
            }
            Buffered::Duplicate => trace!(slot, "block already parked"),
        }
    }

    /// Retry every parked block until a pass places nothing new, then drop
    /// entries that have waited past the retention window.
    pub(super) fn retry_orphans(&self) {
        loop {
            let parked = self.orphans.lock().take_all();
            if parked.is_empty() {
                break;
            }

            let mut progressed = false;
            let mut waiting = Vec::new();
            for (slot, block) in parked {
                match self.place_block(&block) {
                    Ok(Placement::Inserted(_)) => progressed = true,
                    Ok(Placement::Deferred(_)) => waiting.push((slot, block)),
                    Err(e) => {
                        BLOCKS_REJECTED
                            .with_label_values(&[e.rejection_reason()])
                            .inc();
                        debug!(slot, error = %e, "dropping parked block");
                    }
                }
            }

            let mut orphans = self.orphans.lock();
            for (slot, block) in waiting {
                orphans.push(slot, block);
            }
            drop(orphans);

            if !progressed {
                break;
            }
        }

        let expired = self.orphans.lock().prune(self.current_slot());
        if !expired.is_empty() {
            BLOCKS_REJECTED
                .with_label_values(&["expired"])
                .inc_by(expired.len() as u64);
            debug!(count = expired.len(), "dropped expired orphans");
        }
    }
}

//! Slot clock and local block proposal.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use sc_02_fork_choice::ForkChoiceError;
use sc_03_sortition::Ticket;
use sc_04_gossip::Target;
use sc_telemetry::metrics::{BLOCKS_PROPOSED, CHAIN_LENGTH};
use shared_types::{short_hash, Block};
use tracing::{debug, info, warn};

use super::{messages, Node};
use crate::errors::{NodeError, NodeResult};

/// Tick every `slot_duration` until the node closes or is dropped.
pub(super) fn spawn_slot_clock(node: &Arc<Node>) {
    let weak = Arc::downgrade(node);
    let period = node.config.slot_duration;
    let mut shutdown = node.shutdown.subscribe();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.wait_for(|stopped| *stopped) => break,
                _ = tokio::time::sleep(period) => {}
            }
            let Some(node) = weak.upgrade() else {
                break;
            };
            let slot = node.slot.fetch_add(1, Ordering::SeqCst) + 1;
            if let Err(e) = node.propose(slot) {
                warn!(slot, error = %e, "slot processing failed");
            }
        }
        debug!("slot clock stopped");
    });
}

impl Node {
    /// This node's draw for `slot` at its current stake, if it wins.
    pub fn draw(&self, slot: u64) -> NodeResult<Option<Ticket>> {
        let lottery = self
            .lottery
            .get()
            .ok_or(NodeError::GenesisNotInitialized)?;
        let stake = self.ledger.balance(self.account());
        Ok(lottery.draw_for_slot(slot, stake)?)
    }

    /// Run the lottery for `slot` and, on a win, propose a block with every
    /// pending transaction.
    ///
    /// The slot clock calls this on each tick. The local clock is moved
    /// forward to `slot` if it is behind.
    pub fn propose(&self, slot: u64) -> NodeResult<Option<Block>> {
        self.slot.fetch_max(slot, Ordering::SeqCst);
        let lottery = self
            .lottery
            .get()
            .ok_or(NodeError::GenesisNotInitialized)?;
        let Some(ticket) = self.draw(slot)? else {
            return Ok(None);
        };

        let transactions: Vec<String> = self
            .pending
            .drain()
            .into_iter()
            .filter(|id| !self.ledger.is_applied(id))
            .collect();

        let extended =
            self.tree
                .lock()
                .extend_tip(slot, transactions.clone(), self.account().clone());
        let extension = match extended {
            Ok(extension) => extension,
            Err(e) => {
                self.pending.extend(transactions);
                return match e {
                    ForkChoiceError::StaleSlot { tip_slot, .. } => {
                        debug!(slot, tip_slot, "won a slot the tip already passed");
                        Ok(None)
                    }
                    other => Err(other.into()),
                };
            }
        };
        CHAIN_LENGTH.set(extension.length as i64);

        let signature = lottery.seal(&extension.parent_hash, &transactions)?;
        let block = Block {
            transactions,
            proposer: self.account().clone(),
            parent_slot: extension.parent_slot,
            parent_hash: extension.parent_hash,
            slot,
            draw: ticket.draw,
            signature,
        };

        self.transport
            .send(messages::BLOCK, &block, Target::Broadcast, true)?;
        self.credit_reward(&block);

        BLOCKS_PROPOSED.inc();
        info!(
            slot,
            transactions = block.transactions.len(),
            hash = %short_hash(&extension.hash, 4),
            length = extension.length,
            "proposed block"
        );
        Ok(Some(block))
    }
}

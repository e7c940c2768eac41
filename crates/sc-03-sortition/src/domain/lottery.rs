//! Slot lottery: draws, values and the hardness test.

use std::sync::Arc;

use primitive_types::{U256, U512};
use shared_crypto::sha256;
use shared_types::{canonical_bytes, Hash, TypesResult, BASE_BLOCK_REWARD};
use tracing::trace;

use super::SortitionResult;
use crate::ports::DrawSigner;

/// Domain tag mixed into every draw.
pub const LOTTERY_TAG: &str = "LOTTERY";

/// Leading decimal digits inspected by the hardness test.
pub const HARDNESS_DIGITS: usize = 3;

/// The leading digits must exceed this to win.
pub const HARDNESS_THRESHOLD: u32 = 900;

/// Bytes signed to produce the draw for `slot`.
pub fn draw_message(seed: u64, slot: u64) -> TypesResult<Vec<u8>> {
    canonical_bytes(&(LOTTERY_TAG, seed, slot))
}

/// Bytes a proposer signs to seal a block.
pub fn block_signing_message(parent_hash: &Hash, transactions: &[String]) -> TypesResult<Vec<u8>> {
    canonical_bytes(&(parent_hash, transactions))
}

/// `hash(draw) * stake` without overflow.
pub fn lottery_value(draw: &[u8], stake: u64) -> U512 {
    U256::from_big_endian(&sha256(draw)).full_mul(U256::from(stake))
}

/// Whether `value` wins: non-zero, and its first three decimal digits (all of
/// them if it has fewer) read as a number greater than 900.
pub fn above_hardness(value: &U512) -> bool {
    if value.is_zero() {
        return false;
    }
    let decimal = value.to_string();
    let prefix = &decimal[..decimal.len().min(HARDNESS_DIGITS)];
    prefix
        .parse::<u32>()
        .map(|leading| leading > HARDNESS_THRESHOLD)
        .unwrap_or(false)
}

/// Reward credited to the proposer of a block with `tx_count` transactions.
pub fn block_reward(tx_count: usize) -> u64 {
    BASE_BLOCK_REWARD.saturating_add(tx_count as u64)
}

/// A winning draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub slot: u64,
    pub draw: Vec<u8>,
    pub value: U512,
}

/// Per-peer lottery state: the genesis seed and the local signing key.
pub struct SlotLottery<S> {
    seed: u64,
    signer: Arc<S>,
}

impl<S: DrawSigner> SlotLottery<S> {
    pub fn new(seed: u64, signer: Arc<S>) -> Self {
        Self { seed, signer }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw for `slot`; `Some` when it clears the threshold with `stake`.
    pub fn draw_for_slot(&self, slot: u64, stake: u64) -> SortitionResult<Option<Ticket>> {
        let draw = self.signer.sign(&draw_message(self.seed, slot)?);
        let value = lottery_value(&draw, stake);
        let won = above_hardness(&value);
        trace!(slot, stake, won, "slot draw");
        Ok(won.then_some(Ticket { slot, draw, value }))
    }

    /// Sign the block body for a won slot.
    pub fn seal(&self, parent_hash: &Hash, transactions: &[String]) -> SortitionResult<Vec<u8>> {
        Ok(self
            .signer
            .sign(&block_signing_message(parent_hash, transactions)?))
    }
}

//! Checks applied to every received block before it reaches the fork tree.

use shared_types::Block;

use super::{
    above_hardness, block_signing_message, draw_message, lottery_value, SortitionError,
    SortitionResult,
};
use crate::ports::SignatureVerifier;

/// Verify a block's draw, signature and hardness.
///
/// `stake` is the proposer's balance as seen locally.
pub fn verify_block<V: SignatureVerifier + ?Sized>(
    block: &Block,
    seed: u64,
    stake: u64,
    verifier: &V,
) -> SortitionResult<()> {
    let lottery = draw_message(seed, block.slot)?;
    if !verifier.verify(&block.proposer, &lottery, &block.draw) {
        return Err(SortitionError::InvalidDraw { slot: block.slot });
    }

    let body = block_signing_message(&block.parent_hash, &block.transactions)?;
    if !verifier.verify(&block.proposer, &body, &block.signature) {
        return Err(SortitionError::InvalidBlockSignature);
    }

    if !above_hardness(&lottery_value(&block.draw, stake)) {
        return Err(SortitionError::BelowHardness { slot: block.slot });
    }
    Ok(())
}

//! # sc-03-sortition
//!
//! Stake-weighted slot leader election.
//!
//! ## Draw
//!
//! ```text
//! draw  = sign(("LOTTERY", seed, slot))      deterministic signature
//! value = U256(sha256(draw)) * stake         as a 512-bit integer
//! win   = first three decimal digits of value > 900
//! ```
//!
//! Only the key owner can produce a draw, anyone holding the public key can
//! check it, and the value grows linearly with stake so richer accounts win
//! more often.
//!
//! The leading-digit test is coarse and not uniformly distributed; peers must
//! agree on it exactly, so it is kept as is.
//!
//! ## Block Checks
//!
//! A received block is valid when its draw is the proposer's signature over
//! the lottery message, its signature covers `(parent_hash, transactions)`,
//! and the draw clears the threshold with the proposer's stake.

pub mod domain;
pub mod ports;

pub use domain::*;
pub use ports::{DrawSigner, SignatureVerifier};

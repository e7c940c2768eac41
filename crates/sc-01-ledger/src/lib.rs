//! # sc-01-ledger
//!
//! Account balances and the transaction idempotency set.
//!
//! ## Role in System
//!
//! - **Single Source of Truth** for balances, which double as sortition stake
//! - **Replay Target**: the fork tree drives `apply_transaction` and
//!   `reverse_transaction` as the canonical tip moves
//!
//! ## Transfer Rule
//!
//! A transfer of `amount` debits the sender by `amount` and credits the
//! recipient by `amount - 1`; one unit is burned as the validator's cut.
//! Reversal is the exact inverse, so any apply/reverse pair leaves balances
//! and idempotency membership untouched.
//!
//! ## Locking
//!
//! Balances and aliases share one `RwLock`; the applied-id set has its own
//! `Mutex`. Mutations take the applied set first, then balances, so the
//! check-and-mark of an id is atomic with the balance update.

pub mod domain;

pub use domain::*;

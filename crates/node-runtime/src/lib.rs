//! # Slot-Chain Node Runtime
//!
//! One Slot-Chain peer, assembled from the subsystem crates:
//!
//! | Crate | Role in the node |
//! |-------|------------------|
//! | `sc-01-ledger` | balances, aliases and the applied-transaction set |
//! | `sc-02-fork-choice` | block tree, tip selection and ledger replay |
//! | `sc-03-sortition` | slot lottery, block sealing and verification |
//! | `sc-04-gossip` | TCP connections and flooding |
//!
//! The [`Node`] aggregate owns one of each and registers the gossip
//! handlers. The binary in `main.rs` adds configuration, logging and
//! signal handling.
//!
//! ## Startup
//!
//! 1. [`Node::new`] with a [`NodeConfig`] and a signing key
//! 2. [`Node::connect_and_listen`]: bind, bootstrap, start accepting
//! 3. Some peer calls [`Node::send_genesis`]; every peer starts its slot clock
//! 4. [`Node::send_transaction`] at will; winners propose blocks each slot

#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod config;
pub mod errors;
pub mod keystore;
pub mod node;

pub use config::{ConfigError, NodeConfig};
pub use errors::{NodeError, NodeResult};
pub use node::{Deferral, Node, Placement};

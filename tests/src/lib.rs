//! # Slot-Chain Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── harness.rs        # Localhost networks of real nodes
//! │   └── integration/      # Multi-peer scenarios
//! │       ├── transfers.rs  # Payments, rewards, idempotence
//! │       ├── consensus.rs  # Competing proposers, slot clock
//! │       └── flooding.rs   # Exactly-once delivery across a mesh
//! └── benches/              # Criterion benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sc-tests
//! cargo test -p sc-tests integration::consensus
//! cargo bench -p sc-tests
//! ```
//!
//! Set `SC_LOG_LEVEL=debug` to see node logs while a scenario runs.

pub mod harness;
pub mod integration;

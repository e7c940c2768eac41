//! # Adapter Implementations
//!
//! Concrete implementations of the outbound ports the domain crates define:
//!
//! ```text
//! sc-02-fork-choice::StateTransition   <- LedgerTransition
//! sc-03-sortition::DrawSigner          <- KeySigner
//! sc-03-sortition::SignatureVerifier   <- Ed25519Verifier
//! ```

pub mod signature;
pub mod state;

pub use signature::*;
pub use state::*;

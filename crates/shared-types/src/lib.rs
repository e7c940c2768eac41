//! # Shared Types Crate
//!
//! Entities exchanged between peers and passed across subsystem boundaries.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every wire payload is defined here.
//! - **Canonical Encoding**: anything that is signed or hashed goes through
//!   [`canonical_bytes`], so all peers derive identical bytes from identical
//!   values.
//! - **Keys as Addresses**: an account is addressed by its encoded public key
//!   ([`AccountKey`]); there is no separate address derivation.

pub mod encoding;
pub mod entities;
pub mod errors;

pub use encoding::*;
pub use entities::*;
pub use errors::*;

//! # Multi-Peer Scenarios
//!
//! Every scenario runs real nodes over localhost TCP. Unless a test is about
//! the slot clock, slots are driven by hand so outcomes are deterministic.

#[cfg(test)]
mod consensus;
#[cfg(test)]
mod flooding;
#[cfg(test)]
mod transfers;

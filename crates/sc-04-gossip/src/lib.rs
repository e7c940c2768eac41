//! # sc-04-gossip
//!
//! Newline-framed TCP gossip with flood deduplication.
//!
//! ## Wire Format
//!
//! ```text
//! <name> <json payload>\n
//! ```
//!
//! The name never contains a space and JSON never contains a raw newline, so
//! one line is one message.
//!
//! ## Flooding
//!
//! A handler registered with `floods = true` marks its message type as
//! flooded. The first time a node sees a flooded frame it records the frame's
//! SHA-256 digest, re-broadcasts the raw bytes to every other connection and
//! only then runs the handler. Later copies are dropped, so in a connected
//! graph every node handles a flooded message exactly once.
//!
//! ## Tasks
//!
//! Each connection owns a reader task (decodes and dispatches) and a writer
//! task fed by an unbounded queue. Handlers run on the reader task and may
//! send freely; a send only enqueues.

pub mod domain;
mod metrics;
pub mod service;

pub use domain::*;
pub use service::*;

//! Prometheus metrics for Slot-Chain.
//!
//! All metrics follow the naming convention: `sc_<subsystem>_<metric>_<unit>`
//!
//! Collectors are process-global. Several in-process nodes (as in the
//! integration tests) share them, so values are totals across those nodes.

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CHAIN
    // =========================================================================

    /// Blocks this process proposed after winning a slot
    pub static ref BLOCKS_PROPOSED: IntCounter = IntCounter::new(
        "sc_chain_blocks_proposed_total",
        "Blocks proposed after winning the slot lottery"
    ).expect("metric creation failed");

    /// Remote blocks accepted into the fork tree
    pub static ref BLOCKS_ACCEPTED: IntCounter = IntCounter::new(
        "sc_chain_blocks_accepted_total",
        "Remote blocks inserted into the fork tree"
    ).expect("metric creation failed");

    /// Remote blocks dropped, by reason
    pub static ref BLOCKS_REJECTED: IntCounterVec = IntCounterVec::new(
        Opts::new("sc_chain_blocks_rejected_total", "Remote blocks dropped"),
        &["reason"]  // reason: draw/signature/hardness/duplicate/evicted
    ).expect("metric creation failed");

    /// Blocks parked waiting for a parent or transaction
    pub static ref BLOCKS_DEFERRED: IntCounter = IntCounter::new(
        "sc_chain_blocks_deferred_total",
        "Blocks buffered until their parent or transactions arrive"
    ).expect("metric creation failed");

    /// Tip switches that undid at least one block
    pub static ref REORGS: IntCounter = IntCounter::new(
        "sc_chain_reorgs_total",
        "Tip switches that abandoned part of the canonical chain"
    ).expect("metric creation failed");

    /// Length of the canonical chain
    pub static ref CHAIN_LENGTH: IntGauge = IntGauge::new(
        "sc_chain_length",
        "Length of the canonical chain from genesis"
    ).expect("metric creation failed");

    // =========================================================================
    // TRANSACTIONS
    // =========================================================================

    /// Signed transactions accepted into the pending queue
    pub static ref TRANSACTIONS_RECEIVED: IntCounter = IntCounter::new(
        "sc_tx_received_total",
        "Signed transactions accepted from the network or created locally"
    ).expect("metric creation failed");

    /// Pending queue depth
    pub static ref PENDING_TRANSACTIONS: IntGauge = IntGauge::new(
        "sc_tx_pending",
        "Transactions waiting to be proposed"
    ).expect("metric creation failed");

    // =========================================================================
    // GOSSIP
    // =========================================================================

    /// Live connections
    pub static ref PEERS_CONNECTED: IntGauge = IntGauge::new(
        "sc_gossip_peers_connected",
        "Number of currently open gossip connections"
    ).expect("metric creation failed");

    /// Inbound frames by message name
    pub static ref FRAMES_RECEIVED: IntCounterVec = IntCounterVec::new(
        Opts::new("sc_gossip_frames_received_total", "Inbound frames"),
        &["name"]
    ).expect("metric creation failed");

    /// Flooded frames dropped because they were already seen
    pub static ref FLOOD_DUPLICATES: IntCounter = IntCounter::new(
        "sc_gossip_flood_duplicates_total",
        "Flooded frames dropped as already seen"
    ).expect("metric creation failed");
}

/// Handle proving metrics were registered.
pub struct MetricsHandle {
    _registry: Registry,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Chain
        Box::new(BLOCKS_PROPOSED.clone()),
        Box::new(BLOCKS_ACCEPTED.clone()),
        Box::new(BLOCKS_REJECTED.clone()),
        Box::new(BLOCKS_DEFERRED.clone()),
        Box::new(REORGS.clone()),
        Box::new(CHAIN_LENGTH.clone()),
        // Transactions
        Box::new(TRANSACTIONS_RECEIVED.clone()),
        Box::new(PENDING_TRANSACTIONS.clone()),
        // Gossip
        Box::new(PEERS_CONNECTED.clone()),
        Box::new(FRAMES_RECEIVED.clone()),
        Box::new(FLOOD_DUPLICATES.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: REGISTRY.clone(),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

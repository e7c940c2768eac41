//! # Slot-Chain Node
//!
//! Runs one peer until Ctrl+C.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment (`SC_*` variables)
//! 2. Initialize logging and metrics
//! 3. Load or generate the signing key
//! 4. Bind, bootstrap and start accepting connections
//! 5. Founder only: broadcast genesis after `SC_GENESIS_DELAY_SECS`
//!
//! On shutdown the final ledger and block tree are logged.

use std::sync::Arc;

use anyhow::{Context, Result};
use node_runtime::{keystore, Node, NodeConfig};
use sc_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use shared_crypto::Ed25519KeyPair;
use tracing::{debug, info, warn};

/// Load configuration from the environment and check it.
fn load_config() -> Result<NodeConfig> {
    let config = NodeConfig::from_env();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn load_keypair(config: &NodeConfig) -> Result<Ed25519KeyPair> {
    match (&config.key_file, &config.key_passphrase) {
        (Some(path), Some(passphrase)) => keystore::load_or_create(path, passphrase)
            .with_context(|| format!("Failed to load signing key from {}", path.display())),
        _ => {
            info!("no key file configured, using an ephemeral signing key");
            Ok(Ed25519KeyPair::generate())
        }
    }
}

/// The founder waits for peers to join, then names everyone it knows as a
/// stakeholder.
fn schedule_genesis(node: &Arc<Node>) {
    let Some(delay) = node.config().genesis_delay else {
        return;
    };
    if node.config().bootstrap_addr.is_some() {
        warn!("SC_GENESIS_DELAY_SECS is ignored on a joining peer");
        return;
    }
    let node = node.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match node.send_genesis_to_roster() {
            Ok(genesis) => info!(
                seed = genesis.seed,
                stakeholders = genesis.stakeholders.len(),
                "broadcast genesis"
            ),
            Err(e) => warn!(error = %e, "could not broadcast genesis"),
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    let _telemetry = init_telemetry(TelemetryConfig::for_node(&config.alias))
        .context("Failed to initialize telemetry")?;

    let keypair = load_keypair(&config)?;
    let node = Node::new(config, keypair).context("Failed to create node")?;

    let address = node
        .connect_and_listen()
        .await
        .context("Failed to join the network")?;
    info!(alias = node.alias(), %address, "node is running, press Ctrl+C to stop");

    schedule_genesis(&node);

    tokio::signal::ctrl_c().await?;

    info!("final accounts\n{}", node.render_accounts());
    info!("final tree\n{}", node.print_tree());
    match encode_metrics() {
        Ok(metrics) => debug!("metrics\n{metrics}"),
        Err(e) => warn!(error = %e, "could not encode metrics"),
    }
    node.close();

    Ok(())
}

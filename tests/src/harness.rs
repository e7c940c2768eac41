//! Localhost networks of real nodes for integration scenarios.

use std::sync::{Arc, Once};
use std::time::Duration;

use node_runtime::{Node, NodeConfig};
use sc_telemetry::{init_logging, TelemetryConfig};
use shared_crypto::Ed25519KeyPair;
use shared_types::Genesis;

/// Slot length that keeps the clock out of the way; scenarios drive slots
/// by calling [`Node::propose`] themselves.
pub const MANUAL_SLOTS: Duration = Duration::from_secs(3_600);

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const POLL_ATTEMPTS: usize = 500;

static LOGGING: Once = Once::new();

/// Install a quiet subscriber once per test binary.
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let config = TelemetryConfig {
            log_level: std::env::var("SC_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string()),
            ..TelemetryConfig::default()
        };
        let _ = init_logging(&config);
    });
}

/// Poll `check` until it holds, panicking with `what` after ten seconds.
pub async fn eventually(what: &str, mut check: impl FnMut() -> bool) {
    for _ in 0..POLL_ATTEMPTS {
        if check() {
            return;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    panic!("timed out waiting for {what}");
}

/// Nodes on 127.0.0.1, all bootstrapped through the first one.
pub struct TestNetwork {
    nodes: Vec<Arc<Node>>,
}

impl TestNetwork {
    /// Start one node per alias. Each joiner waits for the founder to list
    /// the previous one, so every peer list it receives is complete.
    pub async fn start(aliases: &[&str], slot_duration: Duration) -> Self {
        init_test_logging();
        assert!(!aliases.is_empty(), "a network needs a founder");

        let mut nodes: Vec<Arc<Node>> = Vec::with_capacity(aliases.len());
        let mut founder_addr = None;
        for alias in aliases {
            let config = NodeConfig {
                slot_duration,
                bootstrap_addr: founder_addr.clone(),
                ..NodeConfig::with_alias(alias)
            };
            let node = Node::new(config, Ed25519KeyPair::generate()).unwrap();
            let addr = node.connect_and_listen().await.unwrap();
            if founder_addr.is_none() {
                founder_addr = Some(addr.to_string());
            }
            nodes.push(node);

            let founder = nodes[0].clone();
            let expected = nodes.len();
            eventually("founder to list the new peer", || {
                founder.roster().len() == expected
            })
            .await;
        }

        let network = Self { nodes };
        network.settle_rosters().await;
        network
    }

    /// Start one more node that bootstraps from `net`'s founder, outside the
    /// network's own list. The caller closes it.
    pub async fn start_joining(net: &TestNetwork, alias: &str) -> Arc<Node> {
        let founder = &net.nodes[0];
        let config = NodeConfig {
            slot_duration: founder.config().slot_duration,
            bootstrap_addr: Some(founder.info().address),
            ..NodeConfig::with_alias(alias)
        };
        let node = Node::new(config, Ed25519KeyPair::generate()).unwrap();
        node.connect_and_listen().await.unwrap();

        let expected = net.nodes.len() + 1;
        eventually("the joiner to be known everywhere", || {
            node.roster().len() == expected
                && net.nodes.iter().all(|n| n.roster().len() == expected)
        })
        .await;
        node
    }

    pub async fn settle_rosters(&self) {
        let expected = self.nodes.len();
        eventually("every roster to be complete", || {
            self.nodes.iter().all(|n| n.roster().len() == expected)
        })
        .await;
    }

    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    pub fn node(&self, alias: &str) -> &Arc<Node> {
        self.nodes
            .iter()
            .find(|n| n.alias() == alias)
            .unwrap_or_else(|| panic!("no node named {alias}"))
    }

    /// Founder floods a genesis naming `stakeholders`; waits until every
    /// peer has it.
    pub async fn genesis(&self, stakeholders: &[&str]) -> Genesis {
        let keys = stakeholders
            .iter()
            .map(|alias| self.node(alias).account().clone())
            .collect();
        let genesis = self.nodes[0].send_genesis(keys).unwrap();
        let seed = genesis.seed;
        eventually("genesis on every peer", || {
            self.nodes.iter().all(|n| n.seed() == Some(seed))
        })
        .await;
        genesis
    }

    /// Wait until every peer has the same tip.
    pub async fn converge(&self) {
        eventually("tips to agree", || {
            let tip = self.nodes[0].tip_hash();
            self.nodes.iter().all(|n| n.tip_hash() == tip)
        })
        .await;
    }

    pub fn close(&self) {
        for node in &self.nodes {
            node.close();
        }
    }
}

impl Drop for TestNetwork {
    fn drop(&mut self) {
        self.close();
    }
}

/// First slot at or after `from` that `node` wins at its current stake.
pub fn winning_slot(node: &Node, from: u64) -> u64 {
    (from..from + 10_000)
        .find(|slot| node.draw(*slot).unwrap().is_some())
        .expect("a winning slot within 10k")
}

//! Flooded messages reach every peer exactly once, even through cycles.

use std::time::Duration;

use crate::harness::{eventually, TestNetwork, MANUAL_SLOTS};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_transaction_handled_once_per_peer_in_a_mesh() {
    let net = TestNetwork::start(&["a", "b", "c", "d"], MANUAL_SLOTS).await;
    // d dialled b and c besides its bootstrap link to a: every pair is linked.
    assert_eq!(net.node("d").transport().connection_count(), 3);

    let signed = net.node("a").send_transaction("c", 7).unwrap();
    let id = signed.transaction.id;
    eventually("transaction everywhere", || {
        net.nodes().iter().all(|n| n.known_transaction(&id).is_some())
    })
    .await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let mut duplicates = 0;
    for node in net.nodes() {
        assert_eq!(node.pending(), vec![id.clone()], "{node:?}");
        duplicates += node.transport().stats().flood_duplicates;
    }
    assert!(duplicates > 0, "a full mesh relays copies back");
}

//! Competing proposers and the live slot clock.

use std::time::Duration;

use shared_types::GENESIS_ENDOWMENT;

use crate::harness::{eventually, TestNetwork, MANUAL_SLOTS};

/// A slot both nodes win.
fn shared_winning_slot(a: &node_runtime::Node, b: &node_runtime::Node) -> u64 {
    (1..200_000)
        .find(|slot| a.draw(*slot).unwrap().is_some() && b.draw(*slot).unwrap().is_some())
        .expect("a shared winning slot")
}

// Current-thread runtime: nothing is delivered between the two proposals, so
// both really build on genesis.
#[tokio::test]
async fn test_simultaneous_proposers_converge() {
    let net = TestNetwork::start(&["a", "b"], MANUAL_SLOTS).await;
    net.genesis(&["a", "b"]).await;
    let (a, b) = (net.node("a"), net.node("b"));

    let slot = shared_winning_slot(a, b);
    let from_a = a.propose(slot).unwrap().unwrap();
    let from_b = b.propose(slot).unwrap().unwrap();
    assert_eq!(from_a.parent_slot, 0);
    assert_eq!(from_b.parent_slot, 0);

    eventually("both blocks on both peers", || {
        net.nodes().iter().all(|n| n.tree_len() == 3)
    })
    .await;
    net.converge().await;

    for node in net.nodes() {
        assert_eq!(node.chain_length(), 1);
        // Rewards are paid for every accepted block, canonical or not.
        assert_eq!(node.balance_of("a"), Some(GENESIS_ENDOWMENT + 10));
        assert_eq!(node.balance_of("b"), Some(GENESIS_ENDOWMENT + 10));
    }
}

#[tokio::test]
async fn test_transaction_in_losing_branch_is_not_lost() {
    let net = TestNetwork::start(&["a", "b"], MANUAL_SLOTS).await;
    net.genesis(&["a", "b"]).await;
    let (a, b) = (net.node("a"), net.node("b"));

    let slot = shared_winning_slot(a, b);
    // B proposes before the transaction reaches it.
    let signed = a.send_transaction("b", 40).unwrap();
    let id = signed.transaction.id;
    let from_a = a.propose(slot).unwrap().unwrap();
    let from_b = b.propose(slot).unwrap().unwrap();
    assert_eq!(from_a.transactions, vec![id.clone()]);
    assert!(from_b.transactions.is_empty());

    eventually("both blocks on both peers", || {
        net.nodes().iter().all(|n| n.tree_len() == 3)
    })
    .await;
    net.converge().await;

    let settled = a.ledger().is_applied(&id);
    for node in net.nodes() {
        assert_eq!(node.ledger().is_applied(&id), settled, "{node:?}");
    }
    if settled {
        assert!(a.pending().is_empty());
        assert!(b.pending().is_empty());
    } else {
        // A's block lost the tie-break: A requeues what it abandoned. B saw
        // the id committed in A's block and dropped it from its own queue.
        assert_eq!(a.pending(), vec![id.clone()]);
        assert!(b.pending().is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_slot_clock_grows_the_chain() {
    let net = TestNetwork::start(&["a", "b", "c"], Duration::from_millis(25)).await;
    net.genesis(&["a", "b", "c"]).await;

    eventually("three blocks everywhere", || {
        net.nodes().iter().all(|n| n.chain_length() >= 3)
    })
    .await;
    net.close();

    for node in net.nodes() {
        assert!(node.current_slot() > 0);
        assert!(node.tree_len() >= 4);
    }
}

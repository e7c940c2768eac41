//! Payments between peers, proposer rewards and idempotent replays.

use std::time::Duration;

use shared_types::GENESIS_ENDOWMENT;

use crate::harness::{eventually, winning_slot, TestNetwork, MANUAL_SLOTS};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_payment_settles_on_every_peer() {
    let net = TestNetwork::start(&["a", "b", "c"], MANUAL_SLOTS).await;
    net.genesis(&["a", "c"]).await;
    let (a, b, c) = (net.node("a"), net.node("b"), net.node("c"));

    let signed = a.send_transaction("b", 500).unwrap();
    let id = signed.transaction.id.clone();
    eventually("transaction everywhere", || {
        net.nodes().iter().all(|n| n.pending() == vec![id.clone()])
    })
    .await;

    let slot = winning_slot(c, 1);
    let block = c.propose(slot).unwrap().unwrap();
    assert_eq!(block.transactions, vec![id.clone()]);
    net.converge().await;
    eventually("block everywhere", || {
        net.nodes().iter().all(|n| n.chain_length() == 1)
    })
    .await;

    for node in net.nodes() {
        assert_eq!(node.balance_of("a"), Some(GENESIS_ENDOWMENT - 500), "{node:?}");
        assert_eq!(node.balance_of("b"), Some(499), "{node:?}");
        assert_eq!(node.balance_of("c"), Some(GENESIS_ENDOWMENT + 11), "{node:?}");
        assert!(node.pending().is_empty(), "{node:?}");
        assert!(node.ledger().is_applied(&id));
    }

    // Replaying the signed transaction is a no-op everywhere.
    a.submit_transaction(signed).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    for node in net.nodes() {
        assert!(node.pending().is_empty(), "{node:?}");
        assert_eq!(node.balance_of("b"), Some(499));
    }
    assert_eq!(b.canonical_transactions(), vec![id]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_overdraft_is_skipped_but_block_stands() {
    let net = TestNetwork::start(&["a", "b"], MANUAL_SLOTS).await;
    net.genesis(&["a", "b"]).await;
    let (a, b) = (net.node("a"), net.node("b"));

    let too_much = a.send_transaction("b", GENESIS_ENDOWMENT + 1).unwrap();
    let id = too_much.transaction.id;
    eventually("transaction at b", || b.known_transaction(&id).is_some()).await;

    let slot = winning_slot(b, 1);
    let block = b.propose(slot).unwrap().unwrap();
    assert_eq!(block.transactions, vec![id.clone()]);
    net.converge().await;

    for node in net.nodes() {
        assert_eq!(node.chain_length(), 1);
        assert!(!node.ledger().is_applied(&id));
        assert_eq!(node.balance_of("a"), Some(GENESIS_ENDOWMENT));
        // The reward counts the skipped transaction too.
        assert_eq!(node.balance_of("b"), Some(GENESIS_ENDOWMENT + 11));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_late_joiner_learns_accounts_but_not_history() {
    let net = TestNetwork::start(&["a", "b"], MANUAL_SLOTS).await;
    net.genesis(&["a", "b"]).await;

    let late = TestNetwork::start_joining(&net, "late").await;
    assert!(late.ledger().alias_to_key("a").is_some());
    assert!(late.ledger().alias_to_key("b").is_some());
    assert_eq!(late.seed(), None);
    assert_eq!(late.balance_of("a"), Some(0));
    late.close();
}

//! # Slot-Chain Benchmarks
//!
//! | Area | Operation | Why it matters |
//! |------|-----------|----------------|
//! | Sortition | draw + hardness test | runs every slot on every peer |
//! | Sortition | block verification | runs for every received block |
//! | Fork choice | linear insert, deep reorg | tip switches replay the ledger |
//! | Ledger | apply + reverse | inner loop of every replay |

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use node_runtime::adapters::{Ed25519Verifier, KeySigner};
use sc_01_ledger::Ledger;
use sc_02_fork_choice::ForkTree;
use sc_03_sortition::{verify_block, SlotLottery};
use shared_crypto::Ed25519KeyPair;
use shared_types::{AccountKey, Block, Transaction, GENESIS_ENDOWMENT, ZERO_HASH};

const SEED: u64 = 42;

fn lottery(seed_byte: u8) -> (SlotLottery<KeySigner>, AccountKey) {
    let signer = Arc::new(KeySigner::new(Ed25519KeyPair::from_seed([seed_byte; 32])));
    let account = signer.account_key().clone();
    (SlotLottery::new(SEED, signer), account)
}

fn bench_sortition(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-03-sortition");
    group.measurement_time(Duration::from_secs(5));

    let (lottery, proposer) = lottery(1);
    let mut slot = 0u64;
    group.bench_function("draw_for_slot", |b| {
        b.iter(|| {
            slot += 1;
            black_box(lottery.draw_for_slot(slot, GENESIS_ENDOWMENT).unwrap())
        })
    });

    let ticket = (1..10_000)
        .find_map(|slot| lottery.draw_for_slot(slot, GENESIS_ENDOWMENT).unwrap())
        .expect("a winning slot");
    let transactions: Vec<String> = (0..50).map(|i| format!("tx-{i}")).collect();
    let block = Block {
        signature: lottery.seal(&ZERO_HASH, &transactions).unwrap(),
        transactions,
        proposer,
        parent_slot: 0,
        parent_hash: ZERO_HASH,
        slot: ticket.slot,
        draw: ticket.draw,
    };
    group.bench_function("verify_block_50_tx", |b| {
        b.iter(|| {
            verify_block(black_box(&block), SEED, GENESIS_ENDOWMENT, &Ed25519Verifier).unwrap()
        })
    });

    group.finish();
}

fn bench_fork_choice(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-02-fork-choice");
    let proposer = AccountKey::from_bytes(&[7; 32]);

    for length in [100u64, 1_000] {
        group.throughput(Throughput::Elements(length));
        group.bench_with_input(BenchmarkId::new("linear_insert", length), &length, |b, &length| {
            b.iter(|| {
                let mut tree = ForkTree::new(()).unwrap();
                let mut parent = (0, tree.genesis_hash());
                for slot in 1..=length {
                    let outcome = tree
                        .insert(slot, Vec::new(), proposer.clone(), parent.0, parent.1)
                        .unwrap();
                    parent = (slot, outcome.hash);
                }
                black_box(tree.current_length())
            })
        });
    }

    // Two branches of equal depth off genesis; each iteration swaps the tip.
    let depth = 200u64;
    let mut tree = ForkTree::new(()).unwrap();
    let mut tips = Vec::new();
    for branch in 0..2u64 {
        let mut parent = (0, tree.genesis_hash());
        for step in 1..=depth {
            let slot = step * 2 + branch;
            let outcome = tree
                .insert(slot, vec![format!("{branch}-{step}")], proposer.clone(), parent.0, parent.1)
                .unwrap();
            parent = (slot, outcome.hash);
        }
        tips.push(parent.1);
    }
    let mut flip = 0;
    group.bench_function("reorg_depth_200", |b| {
        b.iter(|| {
            flip ^= 1;
            black_box(tree.go_to(&tips[flip]).unwrap())
        })
    });

    group.finish();
}

fn bench_ledger(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-01-ledger");
    let alice = AccountKey::from_bytes(&[1; 32]);
    let bob = AccountKey::from_bytes(&[2; 32]);
    let ledger = Ledger::new();
    ledger.add_account("alice", alice.clone());
    ledger.add_account("bob", bob.clone());
    ledger.add_money(&alice, GENESIS_ENDOWMENT).unwrap();

    let tx = Transaction::new(alice, bob, 10);
    group.bench_function("apply_then_reverse", |b| {
        b.iter(|| {
            ledger.apply_transaction(black_box(&tx)).unwrap();
            ledger.reverse_transaction(black_box(&tx)).unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_sortition, bench_fork_choice, bench_ledger);
criterion_main!(benches);

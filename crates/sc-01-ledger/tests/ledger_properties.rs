//! Property tests over random transfer sequences.

use proptest::prelude::*;
use sc_01_ledger::Ledger;
use shared_types::{AccountKey, Transaction};

const ACCOUNTS: u8 = 4;

fn key(b: u8) -> AccountKey {
    AccountKey::from_bytes(&[b; 32])
}

fn seeded_ledger(endowments: &[u64]) -> Ledger {
    let ledger = Ledger::new();
    for (i, amount) in endowments.iter().enumerate() {
        let k = key(i as u8);
        ledger.add_account(&format!("peer{i}"), k.clone());
        ledger.add_money(&k, *amount).unwrap();
    }
    ledger
}

fn arb_tx() -> impl Strategy<Value = Transaction> {
    (0..ACCOUNTS, 0..ACCOUNTS, 0u64..2_000, 0u32..64).prop_map(|(from, to, amount, id)| {
        Transaction {
            id: format!("tx-{id}"),
            from: key(from),
            to: key(to),
            amount,
        }
    })
}

proptest! {
    #[test]
    fn prop_apply_then_reverse_is_identity(
        endowments in proptest::collection::vec(0u64..5_000, ACCOUNTS as usize),
        txs in proptest::collection::vec(arb_tx(), 1..40),
    ) {
        let ledger = seeded_ledger(&endowments);
        let before = ledger.snapshot();

        let mut applied = Vec::new();
        for tx in &txs {
            if ledger.apply_transaction(tx).is_ok() {
                applied.push(tx.clone());
            }
        }
        for tx in applied.iter().rev() {
            prop_assert!(ledger.reverse_transaction(tx).is_ok());
        }

        prop_assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn prop_duplicate_ids_apply_once(
        endowments in proptest::collection::vec(1_000u64..5_000, ACCOUNTS as usize),
        tx in arb_tx(),
        repeats in 2usize..6,
    ) {
        let ledger = seeded_ledger(&endowments);
        let first = ledger.apply_transaction(&tx).is_ok();
        let after_first = ledger.snapshot();
        for _ in 1..repeats {
            prop_assert!(ledger.apply_transaction(&tx).is_err());
        }
        prop_assert_eq!(ledger.snapshot(), after_first);
        prop_assert_eq!(ledger.is_applied(&tx.id), first);
    }

    #[test]
    fn prop_supply_only_shrinks_by_burn(
        endowments in proptest::collection::vec(0u64..5_000, ACCOUNTS as usize),
        txs in proptest::collection::vec(arb_tx(), 1..40),
    ) {
        let ledger = seeded_ledger(&endowments);
        let initial: u128 = endowments.iter().map(|v| u128::from(*v)).sum();

        let mut burned = 0u128;
        for tx in &txs {
            if ledger.apply_transaction(tx).is_ok() {
                burned += 1;
            }
        }
        prop_assert_eq!(ledger.total_supply(), initial - burned);
    }

    #[test]
    fn prop_rejections_leave_state_untouched(
        endowments in proptest::collection::vec(0u64..500, ACCOUNTS as usize),
        txs in proptest::collection::vec(arb_tx(), 1..40),
    ) {
        let ledger = seeded_ledger(&endowments);
        for tx in &txs {
            let before = ledger.snapshot();
            if ledger.apply_transaction(tx).is_err() {
                prop_assert_eq!(ledger.snapshot(), before);
            }
        }
    }
}

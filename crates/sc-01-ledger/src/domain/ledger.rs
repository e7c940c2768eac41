//! # Ledger
//!
//! Balances keyed by [`AccountKey`], an [`AliasBook`], and the set of applied
//! transaction ids.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt::Write as _;

use parking_lot::{Mutex, RwLock};
use shared_types::{AccountKey, Transaction};
use tracing::{debug, trace};

use super::{AliasBook, LedgerError, LedgerResult};

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<AccountKey, u64>,
    aliases: AliasBook,
}

/// Point-in-time copy of everything the ledger owns, ordered for comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LedgerSnapshot {
    pub balances: BTreeMap<AccountKey, u64>,
    pub applied: BTreeSet<String>,
}

/// One row of [`Ledger::accounts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEntry {
    pub alias: Option<String>,
    pub key: AccountKey,
    pub balance: u64,
}

/// Thread-safe account ledger.
#[derive(Debug, Default)]
pub struct Ledger {
    state: RwLock<LedgerState>,
    /// Lock order: `applied` before `state`.
    applied: Mutex<HashSet<String>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` under `alias`. An existing balance is kept.
    pub fn add_account(&self, alias: &str, key: AccountKey) {
        let mut state = self.state.write();
        state.balances.entry(key.clone()).or_insert(0);
        state.aliases.insert(alias, key);
    }

    /// Credit without a matching debit, for genesis endowments and block
    /// rewards. An overflowing credit is refused and leaves the balance as is.
    pub fn add_money(&self, key: &AccountKey, amount: u64) -> LedgerResult<()> {
        let mut state = self.state.write();
        let balance = state.balances.entry(key.clone()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(key.to_string()))?;
        trace!(account = key.short(), amount, balance = *balance, "credited");
        Ok(())
    }

    /// Current balance, 0 for unknown accounts.
    pub fn balance(&self, key: &AccountKey) -> u64 {
        self.state.read().balances.get(key).copied().unwrap_or(0)
    }

    pub fn alias_to_key(&self, alias: &str) -> Option<AccountKey> {
        self.state.read().aliases.key_of(alias).cloned()
    }

    pub fn key_to_alias(&self, key: &AccountKey) -> Option<String> {
        self.state.read().aliases.alias_of(key).map(str::to_string)
    }

    pub fn is_applied(&self, id: &str) -> bool {
        self.applied.lock().contains(id)
    }

    /// Apply a transfer.
    ///
    /// Debits `from` by `amount`, credits `to` by `amount - 1` and marks the
    /// id. Refused without side effects if the id is already applied, the
    /// amount is zero, or `from` cannot cover it.
    pub fn apply_transaction(&self, tx: &Transaction) -> LedgerResult<()> {
        let mut applied = self.applied.lock();
        if applied.contains(&tx.id) {
            return Err(LedgerError::AlreadyApplied(tx.id.clone()));
        }
        if tx.amount < 1 {
            return Err(LedgerError::NonPositiveAmount { id: tx.id.clone() });
        }

        let mut state = self.state.write();
        transfer(&mut state.balances, &tx.from, &tx.to, tx.amount, tx.amount - 1)?;
        applied.insert(tx.id.clone());

        debug!(
            tx_id = %tx.id,
            from = tx.from.short(),
            to = tx.to.short(),
            amount = tx.amount,
            "transaction applied"
        );
        Ok(())
    }

    /// Undo a previously applied transfer.
    ///
    /// Debits `to` by `amount - 1`, credits `from` by `amount` and unmarks
    /// the id, which is exactly the inverse of [`Ledger::apply_transaction`].
    pub fn reverse_transaction(&self, tx: &Transaction) -> LedgerResult<()> {
        let mut applied = self.applied.lock();
        if !applied.contains(&tx.id) {
            return Err(LedgerError::NotApplied(tx.id.clone()));
        }

        let mut state = self.state.write();
        // An applied transaction always has amount >= 1.
        transfer(&mut state.balances, &tx.to, &tx.from, tx.amount - 1, tx.amount)?;
        applied.remove(&tx.id);

        debug!(tx_id = %tx.id, amount = tx.amount, "transaction reversed");
        Ok(())
    }

    /// All known accounts sorted by alias, then key.
    pub fn accounts(&self) -> Vec<AccountEntry> {
        let state = self.state.read();
        let mut entries: Vec<AccountEntry> = state
            .balances
            .iter()
            .map(|(key, balance)| AccountEntry {
                alias: state.aliases.alias_of(key).map(str::to_string),
                key: key.clone(),
                balance: *balance,
            })
            .collect();
        entries.sort_by(|a, b| (&a.alias, &a.key).cmp(&(&b.alias, &b.key)));
        entries
    }

    /// Human-readable balance table.
    pub fn render_accounts(&self) -> String {
        let mut out = String::new();
        for entry in self.accounts() {
            let _ = writeln!(
                out,
                "{:<12} {} {:>12}",
                entry.alias.as_deref().unwrap_or("-"),
                entry.key.short(),
                entry.balance
            );
        }
        out
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let applied = self.applied.lock();
        let state = self.state.read();
        LedgerSnapshot {
            balances: state
                .balances
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            applied: applied.iter().cloned().collect(),
        }
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> u128 {
        self.state
            .read()
            .balances
            .values()
            .map(|b| u128::from(*b))
            .sum()
    }
}

/// Move `debit` out of `payer` and `credit` into `payee`, or change nothing.
fn transfer(
    balances: &mut HashMap<AccountKey, u64>,
    payer: &AccountKey,
    payee: &AccountKey,
    debit: u64,
    credit: u64,
) -> LedgerResult<()> {
    let available = balances.get(payer).copied().unwrap_or(0);
    let after_debit = available
        .checked_sub(debit)
        .ok_or(LedgerError::InsufficientBalance {
            required: debit,
            available,
        })?;

    // Self-transfers read the post-debit balance.
    let payee_before = if payer == payee {
        after_debit
    } else {
        balances.get(payee).copied().unwrap_or(0)
    };
    let payee_after = payee_before
        .checked_add(credit)
        .ok_or_else(|| LedgerError::Overflow(payee.to_string()))?;

    balances.insert(payer.clone(), after_debit);
    balances.insert(payee.clone(), payee_after);
    Ok(())
}

//! Known transactions and the pending queue.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use sc_telemetry::metrics::PENDING_TRANSACTIONS;
use shared_types::Transaction;

/// Every transaction this node has seen, by id. Blocks reference these.
#[derive(Debug, Default)]
pub struct TransactionStore {
    known: RwLock<HashMap<String, Transaction>>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `tx`; `false` if the id was already known.
    pub fn insert(&self, tx: Transaction) -> bool {
        let mut known = self.known.write();
        if known.contains_key(&tx.id) {
            return false;
        }
        known.insert(tx.id.clone(), tx);
        true
    }

    pub fn get(&self, id: &str) -> Option<Transaction> {
        self.known.read().get(id).cloned()
    }

    /// Resolve `ids` in order, skipping unknown ones.
    pub fn resolve(&self, ids: &[String]) -> Vec<Transaction> {
        let known = self.known.read();
        ids.iter().filter_map(|id| known.get(id).cloned()).collect()
    }

    /// Ids in `ids` that have not been received.
    pub fn missing(&self, ids: &[String]) -> Vec<String> {
        let known = self.known.read();
        ids.iter()
            .filter(|id| !known.contains_key(id.as_str()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.known.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.read().is_empty()
    }
}

/// Ids waiting to be proposed, oldest first.
#[derive(Debug, Default)]
pub struct PendingQueue {
    ids: Mutex<Vec<String>>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `id` unless it is already waiting.
    pub fn push(&self, id: String) -> bool {
        let mut ids = self.ids.lock();
        if ids.contains(&id) {
            return false;
        }
        ids.push(id);
        PENDING_TRANSACTIONS.set(ids.len() as i64);
        true
    }

    /// Queue each of `ids` that is not already waiting, keeping their order.
    pub fn extend(&self, new_ids: impl IntoIterator<Item = String>) {
        let mut ids = self.ids.lock();
        for id in new_ids {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        PENDING_TRANSACTIONS.set(ids.len() as i64);
    }

    /// Take everything at once.
    pub fn drain(&self) -> Vec<String> {
        let drained = std::mem::take(&mut *self.ids.lock());
        PENDING_TRANSACTIONS.set(0);
        drained
    }

    /// Drop `committed` ids, which a received block already carries.
    pub fn remove_all(&self, committed: &[String]) {
        let mut ids = self.ids.lock();
        ids.retain(|id| !committed.contains(id));
        PENDING_TRANSACTIONS.set(ids.len() as i64);
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.ids.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.lock().is_empty()
    }
}

//! # Orphan Buffer
//!
//! Holds blocks that arrived before their parent (or before the transactions
//! they reference). Bounded two ways:
//!
//! - **capacity**: when full, the oldest entry is evicted to make room
//! - **retention**: entries whose slot falls more than `retention_slots`
//!   behind the local slot are dropped by [`OrphanBuffer::prune`]

use std::collections::VecDeque;

/// Default number of parked entries.
pub const DEFAULT_ORPHAN_CAPACITY: usize = 256;

/// Default slot window an entry may wait.
pub const DEFAULT_ORPHAN_RETENTION: u64 = 32;

/// What happened to a pushed entry.
#[derive(Debug, PartialEq, Eq)]
pub enum Buffered<T> {
    Stored,
    /// Stored, and the oldest entry was evicted to make room.
    StoredEvicting(T),
    /// An equal entry is already parked; nothing changed.
    Duplicate,
}

#[derive(Debug)]
struct Parked<T> {
    slot: u64,
    item: T,
}

/// Bounded FIFO of items waiting for a missing dependency.
#[derive(Debug)]
pub struct OrphanBuffer<T> {
    entries: VecDeque<Parked<T>>,
    capacity: usize,
    retention_slots: u64,
}

impl<T: PartialEq> OrphanBuffer<T> {
    pub fn new(capacity: usize, retention_slots: u64) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            retention_slots,
        }
    }

    pub fn push(&mut self, slot: u64, item: T) -> Buffered<T> {
        if self.entries.iter().any(|parked| parked.item == item) {
            return Buffered::Duplicate;
        }
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front().map(|parked| parked.item)
        } else {
            None
        };
        self.entries.push_back(Parked { slot, item });
        match evicted {
            Some(old) => Buffered::StoredEvicting(old),
            None => Buffered::Stored,
        }
    }

    /// Drop entries older than the retention window and return them.
    pub fn prune(&mut self, current_slot: u64) -> Vec<T> {
        let horizon = current_slot.saturating_sub(self.retention_slots);
        let (keep, expired): (VecDeque<_>, VecDeque<_>) =
            self.entries.drain(..).partition(|parked| parked.slot >= horizon);
        self.entries = keep;
        expired.into_iter().map(|parked| parked.item).collect()
    }

    /// Remove everything, oldest first, for a retry pass. Items that still
    /// cannot be placed are pushed back by the caller.
    pub fn take_all(&mut self) -> Vec<(u64, T)> {
        self.entries
            .drain(..)
            .map(|parked| (parked.slot, parked.item))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: PartialEq> Default for OrphanBuffer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_ORPHAN_CAPACITY, DEFAULT_ORPHAN_RETENTION)
    }
}

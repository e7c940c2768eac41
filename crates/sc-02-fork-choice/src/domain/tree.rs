//! # Fork Tree
//!
//! Arena of [`TreeNode`]s rooted at genesis with a per-slot index for parent
//! lookups. Nodes are never removed.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use shared_types::{short_hash, AccountKey, Hash};
use tracing::{debug, info};

use super::{ChainEntry, ForkChoiceError, ForkChoiceResult, NodeIndex, TreeNode};
use crate::ports::StateTransition;

const GENESIS: NodeIndex = 0;

/// Result of a local tip extension, everything a proposer needs for the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipExtension {
    pub hash: Hash,
    pub length: u64,
    pub parent_slot: u64,
    pub parent_hash: Hash,
}

/// One node entering or leaving the canonical chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorgStep {
    pub hash: Hash,
    pub slot: u64,
    pub transactions: Vec<String>,
}

impl ReorgStep {
    fn of(node: &TreeNode) -> Self {
        Self {
            hash: node.hash,
            slot: node.slot(),
            transactions: node.entry.transactions.clone(),
        }
    }
}

/// The replay performed by a tip switch.
///
/// `undone` is ordered tip-first, `applied` root-first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reorg {
    pub undone: Vec<ReorgStep>,
    pub applied: Vec<ReorgStep>,
}

impl Reorg {
    pub fn is_empty(&self) -> bool {
        self.undone.is_empty() && self.applied.is_empty()
    }

    /// Transaction ids that left the canonical chain and did not come back,
    /// in their original chain order.
    pub fn abandoned_transactions(&self) -> Vec<String> {
        let reapplied: std::collections::HashSet<&str> = self
            .applied
            .iter()
            .flat_map(|step| step.transactions.iter().map(String::as_str))
            .collect();
        self.undone
            .iter()
            .rev()
            .flat_map(|step| step.transactions.iter())
            .filter(|id| !reapplied.contains(id.as_str()))
            .cloned()
            .collect()
    }
}

/// Why the tip did or did not move after an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipDecision {
    /// The new node is longer than the best known chain.
    Longer,
    /// Equal length, and the new node has the greater hash.
    TieBreak,
    /// The tip stays where it was.
    Kept,
}

/// Result of inserting a remote block.
#[derive(Debug, Clone)]
pub struct InsertOutcome {
    pub hash: Hash,
    pub length: u64,
    pub decision: TipDecision,
    pub reorg: Reorg,
}

impl InsertOutcome {
    pub fn tip_changed(&self) -> bool {
        self.decision != TipDecision::Kept
    }
}

/// The fork-choice tree with its injected state transition.
pub struct ForkTree<S> {
    nodes: Vec<TreeNode>,
    by_slot: HashMap<u64, Vec<NodeIndex>>,
    by_hash: HashMap<Hash, NodeIndex>,
    current: NodeIndex,
    longest: u64,
    transition: S,
}

impl<S: StateTransition> ForkTree<S> {
    /// A tree holding only genesis, which is the tip.
    pub fn new(transition: S) -> ForkChoiceResult<Self> {
        let entry = ChainEntry::genesis();
        let hash = entry.content_hash()?;
        let genesis = TreeNode {
            entry,
            hash,
            parent: None,
            children: Vec::new(),
        };
        Ok(Self {
            nodes: vec![genesis],
            by_slot: HashMap::from([(0, vec![GENESIS])]),
            by_hash: HashMap::from([(hash, GENESIS)]),
            current: GENESIS,
            longest: 0,
            transition,
        })
    }

    /// Append a node for `slot` on top of the tip and apply it immediately.
    ///
    /// Used by the local proposer. Fails with `StaleSlot`, leaving the tree
    /// untouched, when `slot` does not advance past the tip's slot.
    pub fn extend_tip(
        &mut self,
        slot: u64,
        transactions: Vec<String>,
        proposer: AccountKey,
    ) -> ForkChoiceResult<TipExtension> {
        let parent = &self.nodes[self.current];
        if slot <= parent.slot() {
            return Err(ForkChoiceError::StaleSlot {
                slot,
                tip_slot: parent.slot(),
            });
        }
        let parent_slot = parent.slot();
        let parent_hash = parent.hash;
        let length = parent.length() + 1;

        let entry = ChainEntry {
            slot,
            length,
            parent_hash,
            proposer: Some(proposer),
            transactions,
        };
        let index = self.link(self.current, entry)?;

        let node = &self.nodes[index];
        self.transition.apply(&node.hash, &node.entry.transactions);
        self.current = index;
        self.longest = length;

        let hash = self.nodes[index].hash;
        debug!(slot, length, hash = %short_hash(&hash, 4), "extended tip");
        Ok(TipExtension {
            hash,
            length,
            parent_slot,
            parent_hash,
        })
    }

    /// Link a remotely proposed node under its parent, then run fork choice.
    ///
    /// The node is not applied unless fork choice moves the tip onto it.
    pub fn insert(
        &mut self,
        slot: u64,
        transactions: Vec<String>,
        proposer: AccountKey,
        parent_slot: u64,
        parent_hash: Hash,
    ) -> ForkChoiceResult<InsertOutcome> {
        let parent = self
            .find(parent_slot, &parent_hash)
            .ok_or(ForkChoiceError::UnknownParent {
                parent_slot,
                parent_hash,
            })?;
        let parent_node = &self.nodes[parent];
        if slot <= parent_node.slot() {
            return Err(ForkChoiceError::InvalidSlot {
                slot,
                parent_slot: parent_node.slot(),
            });
        }

        let entry = ChainEntry {
            slot,
            length: parent_node.length() + 1,
            parent_hash,
            proposer: Some(proposer),
            transactions,
        };
        let index = self.link(parent, entry)?;
        let (decision, reorg) = self.choose(index);

        let node = &self.nodes[index];
        Ok(InsertOutcome {
            hash: node.hash,
            length: node.length(),
            decision,
            reorg,
        })
    }

    /// Move the tip to `target`, replaying the ledger along the way.
    pub fn go_to(&mut self, target: &Hash) -> ForkChoiceResult<Reorg> {
        let index = *self
            .by_hash
            .get(target)
            .ok_or(ForkChoiceError::UnknownNode(*target))?;
        Ok(self.switch_to(index))
    }

    fn choose(&mut self, candidate: NodeIndex) -> (TipDecision, Reorg) {
        let cand = &self.nodes[candidate];
        let decision = if cand.length() > self.longest {
            TipDecision::Longer
        } else if cand.length() == self.longest && cand.hash > self.nodes[self.current].hash {
            TipDecision::TieBreak
        } else {
            TipDecision::Kept
        };

        let reorg = match decision {
            TipDecision::Kept => Reorg::default(),
            _ => self.switch_to(candidate),
        };
        (decision, reorg)
    }

    fn switch_to(&mut self, target: NodeIndex) -> Reorg {
        let mut reorg = Reorg::default();
        if target == self.current {
            return reorg;
        }
        let ancestor = self.common_ancestor(self.current, target);

        let mut cursor = self.current;
        while cursor != ancestor {
            let node = &self.nodes[cursor];
            self.transition.undo(&node.hash, &node.entry.transactions);
            reorg.undone.push(ReorgStep::of(node));
            match node.parent {
                Some(parent) => cursor = parent,
                None => break,
            }
        }

        let mut path = Vec::new();
        let mut cursor = target;
        while cursor != ancestor {
            path.push(cursor);
            match self.nodes[cursor].parent {
                Some(parent) => cursor = parent,
                None => break,
            }
        }
        for index in path.into_iter().rev() {
            let node = &self.nodes[index];
            self.transition.apply(&node.hash, &node.entry.transactions);
            reorg.applied.push(ReorgStep::of(node));
        }

        self.current = target;
        self.longest = self.nodes[target].length();

        if reorg.undone.is_empty() {
            debug!(
                length = self.longest,
                hash = %short_hash(&self.nodes[target].hash, 4),
                "tip advanced"
            );
        } else {
            info!(
                undone = reorg.undone.len(),
                applied = reorg.applied.len(),
                length = self.longest,
                hash = %short_hash(&self.nodes[target].hash, 4),
                "tip switched to another branch"
            );
        }
        reorg
    }

    fn link(&mut self, parent: NodeIndex, entry: ChainEntry) -> ForkChoiceResult<NodeIndex> {
        let hash = entry.content_hash()?;
        if self.by_hash.contains_key(&hash) {
            return Err(ForkChoiceError::DuplicateBlock(hash));
        }
        let index = self.nodes.len();
        let slot = entry.slot;
        self.nodes.push(TreeNode {
            entry,
            hash,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(index);
        self.by_slot.entry(slot).or_default().push(index);
        self.by_hash.insert(hash, index);
        Ok(index)
    }
}

impl<S> ForkTree<S> {
    fn find(&self, slot: u64, hash: &Hash) -> Option<NodeIndex> {
        self.by_slot
            .get(&slot)?
            .iter()
            .copied()
            .find(|&index| self.nodes[index].hash == *hash)
    }

    fn common_ancestor(&self, mut a: NodeIndex, mut b: NodeIndex) -> NodeIndex {
        while self.nodes[a].length() > self.nodes[b].length() {
            a = self.nodes[a].parent.unwrap_or(GENESIS);
        }
        while self.nodes[b].length() > self.nodes[a].length() {
            b = self.nodes[b].parent.unwrap_or(GENESIS);
        }
        while a != b {
            a = self.nodes[a].parent.unwrap_or(GENESIS);
            b = self.nodes[b].parent.unwrap_or(GENESIS);
        }
        a
    }

    pub fn genesis_hash(&self) -> Hash {
        self.nodes[GENESIS].hash
    }

    pub fn current_hash(&self) -> Hash {
        self.nodes[self.current].hash
    }

    pub fn current_slot(&self) -> u64 {
        self.nodes[self.current].slot()
    }

    pub fn current_length(&self) -> u64 {
        self.nodes[self.current].length()
    }

    pub fn longest(&self) -> u64 {
        self.longest
    }

    /// Number of nodes including genesis.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: genesis is present from construction.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.by_hash.contains_key(hash)
    }

    /// Whether a node at `slot` with `hash` exists, via the slot index.
    pub fn contains_at(&self, slot: u64, hash: &Hash) -> bool {
        self.find(slot, hash).is_some()
    }

    pub fn node(&self, hash: &Hash) -> Option<&TreeNode> {
        self.by_hash.get(hash).map(|&index| &self.nodes[index])
    }

    pub fn nodes_at_slot(&self, slot: u64) -> Vec<&TreeNode> {
        self.by_slot
            .get(&slot)
            .map(|indices| indices.iter().map(|&i| &self.nodes[i]).collect())
            .unwrap_or_default()
    }

    pub fn transactions_of(&self, hash: &Hash) -> Option<&[String]> {
        self.node(hash).map(|node| node.entry.transactions.as_slice())
    }

    /// Whether `ancestor` lies on the path from genesis to `descendant`
    /// (a node is its own ancestor).
    pub fn is_ancestor(&self, ancestor: &Hash, descendant: &Hash) -> bool {
        let (Some(&a), Some(&d)) = (self.by_hash.get(ancestor), self.by_hash.get(descendant))
        else {
            return false;
        };
        let target_length = self.nodes[a].length();
        let mut cursor = d;
        while self.nodes[cursor].length() > target_length {
            match self.nodes[cursor].parent {
                Some(parent) => cursor = parent,
                None => return false,
            }
        }
        cursor == a
    }

    /// Hashes from genesis to the tip.
    pub fn canonical_chain(&self) -> Vec<Hash> {
        let mut chain = Vec::with_capacity(self.longest as usize + 1);
        let mut cursor = Some(self.current);
        while let Some(index) = cursor {
            chain.push(self.nodes[index].hash);
            cursor = self.nodes[index].parent;
        }
        chain.reverse();
        chain
    }

    /// Transaction ids on the canonical chain, in apply order.
    pub fn canonical_transactions(&self) -> Vec<String> {
        self.canonical_chain()
            .iter()
            .filter_map(|hash| self.transactions_of(hash))
            .flat_map(|txs| txs.iter().cloned())
            .collect()
    }

    pub fn transition(&self) -> &S {
        &self.transition
    }

    pub fn transition_mut(&mut self) -> &mut S {
        &mut self.transition
    }

    /// Debug dump of every node grouped by slot; `*` marks the tip.
    pub fn render(&self) -> String {
        let ordered: BTreeMap<u64, &Vec<NodeIndex>> =
            self.by_slot.iter().map(|(slot, v)| (*slot, v)).collect();

        let mut out = String::new();
        for (slot, indices) in ordered {
            let cells: Vec<String> = indices
                .iter()
                .map(|&index| {
                    let node = &self.nodes[index];
                    format!(
                        "({} {} {} {}){}",
                        short_hash(&node.hash, 4),
                        slot,
                        short_hash(&node.entry.parent_hash, 4),
                        node.entry.transactions.len(),
                        if index == self.current { "*" } else { "" }
                    )
                })
                .collect();
            out.push_str(&format!("{:>5}: {}\n", slot, cells.join(" ")));
        }
        out
    }
}

impl<S> fmt::Display for ForkTree<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<S> fmt::Debug for ForkTree<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForkTree")
            .field("nodes", &self.nodes.len())
            .field("current", &short_hash(&self.current_hash(), 4))
            .field("longest", &self.longest)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every call so tests can check replay order.
    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
    }

    impl StateTransition for Recorder {
        fn apply(&mut self, _block: &Hash, transactions: &[String]) {
            for tx in transactions {
                self.log.push(format!("+{tx}"));
            }
        }

        fn undo(&mut self, _block: &Hash, transactions: &[String]) {
            for tx in transactions.iter().rev() {
                self.log.push(format!("-{tx}"));
            }
        }
    }

    fn proposer(b: u8) -> AccountKey {
        AccountKey::from_bytes(&[b; 32])
    }

    fn txs(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn make_tree() -> ForkTree<Recorder> {
        ForkTree::new(Recorder::default()).unwrap()
    }

    #[test]
    fn test_genesis_only() {
        let tree = make_tree();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.current_slot(), 0);
        assert_eq!(tree.longest(), 0);
        assert_eq!(tree.current_hash(), tree.genesis_hash());
    }

    #[test]
    fn test_extend_tip_applies_and_advances() {
        let mut tree = make_tree();
        let ext = tree.extend_tip(1, txs(&["a"]), proposer(1)).unwrap();
        assert_eq!(ext.parent_slot, 0);
        assert_eq!(ext.parent_hash, tree.genesis_hash());
        assert_eq!(tree.current_hash(), ext.hash);
        assert_eq!(tree.longest(), 1);
        assert_eq!(tree.transition().log, vec!["+a"]);
    }

    #[test]
    fn test_extend_tip_stale_slot_leaves_tree_untouched() {
        let mut tree = make_tree();
        tree.extend_tip(3, txs(&["a"]), proposer(1)).unwrap();
        let err = tree.extend_tip(3, txs(&["b"]), proposer(1)).unwrap_err();
        assert_eq!(err, ForkChoiceError::StaleSlot { slot: 3, tip_slot: 3 });
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.transition().log, vec!["+a"]);
    }

    #[test]
    fn test_insert_unknown_parent_is_recoverable() {
        let mut tree = make_tree();
        let err = tree
            .insert(2, txs(&["x"]), proposer(2), 1, [9u8; 32])
            .unwrap_err();
        assert!(matches!(err, ForkChoiceError::UnknownParent { parent_slot: 1, .. }));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_insert_wrong_slot_for_known_hash() {
        let mut tree = make_tree();
        let genesis = tree.genesis_hash();
        // Right hash, wrong slot: the slot index does not resolve it.
        let err = tree.insert(2, vec![], proposer(2), 1, genesis).unwrap_err();
        assert!(matches!(err, ForkChoiceError::UnknownParent { .. }));
    }

    #[test]
    fn test_insert_longer_switches() {
        let mut tree = make_tree();
        let genesis = tree.genesis_hash();
        let outcome = tree.insert(1, txs(&["a"]), proposer(2), 0, genesis).unwrap();
        assert_eq!(outcome.decision, TipDecision::Longer);
        assert_eq!(tree.current_hash(), outcome.hash);
        assert_eq!(tree.transition().log, vec!["+a"]);
    }

    #[test]
    fn test_insert_duplicate_rejected() {
        let mut tree = make_tree();
        let genesis = tree.genesis_hash();
        tree.insert(1, txs(&["a"]), proposer(2), 0, genesis).unwrap();
        let err = tree.insert(1, txs(&["a"]), proposer(2), 0, genesis).unwrap_err();
        assert!(matches!(err, ForkChoiceError::DuplicateBlock(_)));
    }

    #[test]
    fn test_insert_slot_must_advance() {
        let mut tree = make_tree();
        let ext = tree.extend_tip(5, vec![], proposer(1)).unwrap();
        let err = tree.insert(5, vec![], proposer(2), 5, ext.hash).unwrap_err();
        assert_eq!(err, ForkChoiceError::InvalidSlot { slot: 5, parent_slot: 5 });
    }

    #[test]
    fn test_tie_break_prefers_greater_hash() {
        let mut tree = make_tree();
        let genesis = tree.genesis_hash();
        let a = tree.insert(1, txs(&["a"]), proposer(1), 0, genesis).unwrap();
        let b = tree.insert(1, txs(&["b"]), proposer(2), 0, genesis).unwrap();

        let winner = a.hash.max(b.hash);
        assert_eq!(tree.current_hash(), winner);
        if b.hash > a.hash {
            assert_eq!(b.decision, TipDecision::TieBreak);
            assert_eq!(tree.transition().log, vec!["+a", "-a", "+b"]);
        } else {
            assert_eq!(b.decision, TipDecision::Kept);
            assert_eq!(tree.transition().log, vec!["+a"]);
        }
    }

    #[test]
    fn test_tie_break_is_order_independent() {
        let mut first = make_tree();
        let mut second = make_tree();
        let genesis = first.genesis_hash();

        first.insert(1, txs(&["a"]), proposer(1), 0, genesis).unwrap();
        first.insert(1, txs(&["b"]), proposer(2), 0, genesis).unwrap();
        second.insert(1, txs(&["b"]), proposer(2), 0, genesis).unwrap();
        second.insert(1, txs(&["a"]), proposer(1), 0, genesis).unwrap();

        assert_eq!(first.current_hash(), second.current_hash());
    }

    #[test]
    fn test_shorter_branch_is_kept_aside() {
        let mut tree = make_tree();
        let genesis = tree.genesis_hash();
        tree.extend_tip(1, txs(&["a"]), proposer(1)).unwrap();
        let tip = tree.extend_tip(2, txs(&["b"]), proposer(1)).unwrap();

        let side = tree.insert(1, txs(&["c"]), proposer(2), 0, genesis).unwrap();
        assert_eq!(side.decision, TipDecision::Kept);
        assert!(side.reorg.is_empty());
        assert_eq!(tree.current_hash(), tip.hash);
    }

    #[test]
    fn test_reorg_undoes_to_ancestor_then_applies() {
        let mut tree = make_tree();
        let genesis = tree.genesis_hash();
        let a = tree.extend_tip(1, txs(&["a1", "a2"]), proposer(1)).unwrap();

        let b1 = tree.insert(2, txs(&["b1"]), proposer(2), 0, genesis).unwrap();
        // Pin the tip on `a` whatever the tie-break decided.
        tree.go_to(&a.hash).unwrap();
        tree.transition_mut().log.clear();

        let b2 = tree.insert(3, txs(&["b2"]), proposer(2), 2, b1.hash).unwrap();

        assert_eq!(b2.decision, TipDecision::Longer);
        assert_eq!(b2.reorg.undone.len(), 1);
        assert_eq!(b2.reorg.applied.len(), 2);
        assert_eq!(tree.current_hash(), b2.hash);
        assert_eq!(tree.current_length(), 2);
        assert_eq!(tree.transition().log, vec!["-a2", "-a1", "+b1", "+b2"]);
        assert_eq!(b2.reorg.abandoned_transactions(), txs(&["a1", "a2"]));
    }

    #[test]
    fn test_go_to_round_trip() {
        let mut tree = make_tree();
        let genesis = tree.genesis_hash();
        let a = tree.extend_tip(1, txs(&["a"]), proposer(1)).unwrap();
        let b = tree.insert(2, txs(&["b"]), proposer(2), 0, genesis).unwrap();

        tree.go_to(&b.hash).unwrap();
        tree.go_to(&a.hash).unwrap();
        assert_eq!(tree.current_hash(), a.hash);
        assert_eq!(tree.canonical_transactions(), txs(&["a"]));
    }

    #[test]
    fn test_go_to_unknown() {
        let mut tree = make_tree();
        assert!(matches!(
            tree.go_to(&[1u8; 32]),
            Err(ForkChoiceError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_is_ancestor_and_chain() {
        let mut tree = make_tree();
        let genesis = tree.genesis_hash();
        let a = tree.extend_tip(1, vec![], proposer(1)).unwrap();
        let b = tree.extend_tip(2, vec![], proposer(1)).unwrap();
        let side = tree.insert(2, txs(&["s"]), proposer(2), 0, genesis).unwrap();

        assert!(tree.is_ancestor(&genesis, &b.hash));
        assert!(tree.is_ancestor(&a.hash, &b.hash));
        assert!(!tree.is_ancestor(&a.hash, &side.hash));
        assert_eq!(tree.canonical_chain(), vec![genesis, a.hash, b.hash]);
    }

    #[test]
    fn test_render_marks_tip() {
        let mut tree = make_tree();
        let ext = tree.extend_tip(1, txs(&["a", "b"]), proposer(1)).unwrap();
        let dump = tree.render();
        assert_eq!(dump.lines().count(), 2);
        let tip_cell = format!("({} 1 ", short_hash(&ext.hash, 4));
        assert!(dump.contains(&tip_cell));
        assert!(dump.contains(" 2)*"));
    }

    #[test]
    fn test_nodes_at_slot() {
        let mut tree = make_tree();
        let genesis = tree.genesis_hash();
        tree.insert(1, txs(&["a"]), proposer(1), 0, genesis).unwrap();
        tree.insert(1, txs(&["b"]), proposer(2), 0, genesis).unwrap();
        assert_eq!(tree.nodes_at_slot(1).len(), 2);
        assert!(tree.nodes_at_slot(7).is_empty());
    }
}

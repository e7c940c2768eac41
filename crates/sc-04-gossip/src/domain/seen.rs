use std::collections::HashSet;

use shared_crypto::{sha256, Digest32};

/// Digests of every flooded frame this node has handled or sent.
///
/// Raw-byte identity: two frames are the same message exactly when their
/// bytes are equal.
#[derive(Debug, Default)]
pub struct SeenSet {
    digests: HashSet<Digest32>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `frame`; `true` if it had not been seen before.
    pub fn insert(&mut self, frame: &[u8]) -> bool {
        self.digests.insert(sha256(frame))
    }

    pub fn contains(&self, frame: &[u8]) -> bool {
        self.digests.contains(&sha256(frame))
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_insert_wins() {
        let mut seen = SeenSet::new();
        assert!(seen.insert(b"block {}\n"));
        assert!(!seen.insert(b"block {}\n"));
        assert!(seen.contains(b"block {}\n"));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_byte_identity() {
        let mut seen = SeenSet::new();
        seen.insert(b"block {\"a\":1}\n");
        assert!(seen.insert(b"block {\"a\": 1}\n"));
    }
}

use parking_lot::Mutex;
use shared_types::PeerInfo;

/// Append-only list of known peers, deduplicated by public key.
///
/// The local peer is always the first entry, which lets a joining peer tell
/// the bootstrap peer's own entry apart from the rest of a `peerInfoList`.
#[derive(Debug, Default)]
pub struct Roster {
    peers: Mutex<Vec<PeerInfo>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `info` unless its key is already listed.
    pub fn add(&self, info: PeerInfo) -> bool {
        let mut peers = self.peers.lock();
        if peers.iter().any(|p| p.public_key == info.public_key) {
            return false;
        }
        peers.push(info);
        true
    }

    pub fn list(&self) -> Vec<PeerInfo> {
        self.peers.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.peers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.lock().is_empty()
    }
}

/// The entries a joining peer dials: at most `limit` of the most recent ones,
/// excluding the bootstrap peer's own entry (the first) and `own` key.
pub fn dial_candidates<'a>(
    list: &'a [PeerInfo],
    own: &shared_types::AccountKey,
    limit: usize,
) -> Vec<&'a PeerInfo> {
    let others: Vec<&PeerInfo> = list
        .iter()
        .skip(1)
        .filter(|info| &info.public_key != own)
        .collect();
    let start = others.len().saturating_sub(limit);
    others[start..].to_vec()
}

#[cfg(test)]
mod tests {
    use shared_types::AccountKey;

    use super::*;

    fn info(n: u8) -> PeerInfo {
        PeerInfo {
            alias: format!("p{n}"),
            address: format!("127.0.0.1:{}", 9000 + n as u16),
            public_key: AccountKey::from_bytes(&[n; 32]),
        }
    }

    #[test]
    fn test_dedup_by_key() {
        let roster = Roster::new();
        assert!(roster.add(info(1)));
        let mut renamed = info(1);
        renamed.alias = "other".into();
        assert!(!roster.add(renamed));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_dial_candidates_take_most_recent() {
        let list: Vec<PeerInfo> = (0..15).map(info).collect();
        let own = AccountKey::from_bytes(&[99; 32]);
        let picked: Vec<&str> = dial_candidates(&list, &own, 10)
            .iter()
            .map(|p| p.alias.as_str())
            .collect();
        assert_eq!(picked.len(), 10);
        assert_eq!(picked.first(), Some(&"p5"));
        assert_eq!(picked.last(), Some(&"p14"));
    }

    #[test]
    fn test_dial_candidates_skip_bootstrap_and_self() {
        let list = vec![info(0), info(1), info(2)];
        let own = info(2).public_key;
        let picked: Vec<&str> = dial_candidates(&list, &own, 10)
            .iter()
            .map(|p| p.alias.as_str())
            .collect();
        assert_eq!(picked, vec!["p1"]);
    }
}

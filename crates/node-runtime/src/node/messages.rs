//! Wire message names.

/// Flooded `PeerInfo` announcement.
pub const PRESENCE: &str = "presence";
/// Flooded `SignedTransaction`.
pub const TRANSACTION: &str = "transaction";
/// Roster request, sent to one connection with a `null` payload.
pub const GET_PEER_INFO_LIST: &str = "getPeerInfoList";
/// Roster reply, `Vec<PeerInfo>`.
pub const PEER_INFO_LIST: &str = "peerInfoList";
/// Flooded `Genesis`.
pub const GENESIS: &str = "genesis";
/// Flooded `Block`.
pub const BLOCK: &str = "block";

//! Gossip message handlers.
//!
//! | Message | Floods | Payload |
//! |---------|--------|---------|
//! | `presence` | yes | `PeerInfo` |
//! | `transaction` | yes | `SignedTransaction` |
//! | `getPeerInfoList` | no | `null` |
//! | `peerInfoList` | no | `Vec<PeerInfo>` |
//! | `genesis` | yes | `Genesis` |
//! | `block` | yes | `Block` |

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use sc_04_gossip::{ConnectionId, Target};
use shared_types::{Block, Genesis, PeerInfo, SignedTransaction};
use tracing::{debug, warn};

use super::{messages, Node};
use crate::errors::NodeError;

pub(super) fn register(node: &Arc<Node>) {
    on(node, messages::PRESENCE, true, on_presence);
    on(node, messages::TRANSACTION, true, on_transaction);
    on(node, messages::GET_PEER_INFO_LIST, false, on_get_peer_info_list);
    on(node, messages::PEER_INFO_LIST, false, on_peer_info_list);
    on(node, messages::GENESIS, true, on_genesis);
    on(node, messages::BLOCK, true, on_block);
}

/// Register `handle` for `name`, decoding the payload as `T` first.
fn on<T, F>(node: &Arc<Node>, name: &'static str, floods: bool, handle: F)
where
    T: DeserializeOwned + 'static,
    F: Fn(&Arc<Node>, ConnectionId, T) + Send + Sync + 'static,
{
    let weak = Arc::downgrade(node);
    node.transport.register_handler(
        name,
        move |origin: ConnectionId, payload: &[u8]| {
            let Some(node) = weak.upgrade() else {
                return;
            };
            match serde_json::from_slice::<T>(payload) {
                Ok(message) => handle(&node, origin, message),
                Err(e) => warn!(%origin, message = name, error = %e, "dropping malformed payload"),
            }
        },
        floods,
    );
}

fn on_presence(node: &Arc<Node>, _origin: ConnectionId, info: PeerInfo) {
    if &info.public_key == node.account() {
        return;
    }
    node.ledger.add_account(&info.alias, info.public_key.clone());
    let alias = info.alias.clone();
    if node.roster.add(info) {
        debug!(peer = %alias, "peer announced presence");
    }
}

fn on_transaction(node: &Arc<Node>, origin: ConnectionId, signed: SignedTransaction) {
    if !node.verifier.verify_transaction(&signed) {
        debug!(%origin, id = %signed.transaction.id, "could not verify transaction signature");
        return;
    }
    node.accept_transaction(signed.transaction);
}

fn on_get_peer_info_list(node: &Arc<Node>, origin: ConnectionId, _: ()) {
    let roster = node.roster.list();
    if let Err(e) = node.transport.send(
        messages::PEER_INFO_LIST,
        &roster,
        Target::Connection(origin),
        false,
    ) {
        warn!(%origin, error = %e, "could not send peer list");
    }
}

fn on_peer_info_list(node: &Arc<Node>, origin: ConnectionId, list: Vec<PeerInfo>) {
    if node.joined.swap(true, Ordering::SeqCst) {
        debug!(%origin, "already joined, ignoring peer list");
        return;
    }
    tokio::spawn(node.clone().join_network(list));
}

fn on_genesis(node: &Arc<Node>, origin: ConnectionId, genesis: Genesis) {
    match node.initialize_genesis(genesis) {
        Ok(()) => {}
        Err(NodeError::GenesisAlreadyInitialized) => {
            debug!(%origin, "ignoring second genesis");
        }
        Err(e) => warn!(%origin, error = %e, "could not initialize genesis"),
    }
}

fn on_block(node: &Arc<Node>, _origin: ConnectionId, block: Block) {
    // Rejections are logged and counted inside.
    let _ = node.receive_block(block);
}

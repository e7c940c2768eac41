//! # Node
//!
//! One peer: all peer-local state behind a single `Arc<Node>`.
//!
//! ```text
//!              ┌──────────── Node ─────────────┐
//! slot clock ─→│ propose ─→ tree.extend_tip    │─→ gossip "block"
//!              │                               │
//!  gossip  ───→│ handlers ─→ verify ─→ tree    │
//!              │          └→ pending / store   │
//!              └───────────────────────────────┘
//! ```
//!
//! ## Locking
//!
//! The fork tree (with its ledger replay) sits behind one mutex, so a tip
//! switch and the ledger moving with it are a single step to any observer.
//! Lock order is tree → transaction store → ledger; nothing takes the tree
//! while holding a ledger lock.
//!
//! Handlers capture `Weak<Node>`, so dropping the last `Arc` releases the
//! node even while connections are open.

mod blocks;
mod handlers;
pub mod messages;
mod pool;
mod roster;
mod slots;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};
use sc_01_ledger::{Ledger, LedgerError};
use sc_02_fork_choice::{ForkTree, OrphanBuffer};
use sc_03_sortition::SlotLottery;
use sc_04_gossip::{GossipTransport, Target};
use sc_telemetry::metrics::TRANSACTIONS_RECEIVED;
use shared_crypto::Ed25519KeyPair;
use shared_types::{
    AccountKey, Block, Genesis, Hash, PeerInfo, SignedTransaction, Transaction, GENESIS_ENDOWMENT,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub use blocks::{Deferral, Placement};
pub use pool::{PendingQueue, TransactionStore};
pub use roster::{dial_candidates, Roster};

use crate::adapters::{Ed25519Verifier, KeySigner, LedgerTransition};
use crate::config::NodeConfig;
use crate::errors::{NodeError, NodeResult};

pub struct Node {
    config: NodeConfig,
    signer: Arc<KeySigner>,
    verifier: Ed25519Verifier,
    info: RwLock<PeerInfo>,

    ledger: Arc<Ledger>,
    store: Arc<TransactionStore>,
    pending: PendingQueue,
    tree: Mutex<ForkTree<LedgerTransition>>,
    orphans: Mutex<OrphanBuffer<Block>>,
    roster: Roster,

    /// Set once, by the first genesis.
    lottery: OnceLock<SlotLottery<KeySigner>>,
    /// Local slot clock.
    slot: AtomicU64,

    transport: GossipTransport,
    /// Bound at startup, handed to the accept loop once bootstrap completes.
    listener: Mutex<Option<TcpListener>>,
    joined: AtomicBool,
    accepting: watch::Sender<bool>,
    shutdown: watch::Sender<bool>,
}

impl Node {
    /// Build a node and register its message handlers. Nothing is bound or
    /// dialled until [`Node::connect_and_listen`].
    pub fn new(config: NodeConfig, keypair: Ed25519KeyPair) -> NodeResult<Arc<Self>> {
        config.validate()?;

        let signer = Arc::new(KeySigner::new(keypair));
        let account = signer.account_key().clone();

        let ledger = Arc::new(Ledger::new());
        ledger.add_account(&config.alias, account.clone());
        let store = Arc::new(TransactionStore::new());
        let tree = ForkTree::new(LedgerTransition::new(ledger.clone(), store.clone()))?;
        let orphans = OrphanBuffer::new(config.orphan_capacity, config.orphan_retention);

        let info = PeerInfo {
            alias: config.alias.clone(),
            address: String::new(),
            public_key: account.clone(),
        };
        let (accepting, _) = watch::channel(false);
        let (shutdown, _) = watch::channel(false);

        let node = Arc::new(Self {
            config,
            signer,
            verifier: Ed25519Verifier,
            info: RwLock::new(info),
            ledger,
            store,
            pending: PendingQueue::new(),
            tree: Mutex::new(tree),
            orphans: Mutex::new(orphans),
            roster: Roster::new(),
            lottery: OnceLock::new(),
            slot: AtomicU64::new(0),
            transport: GossipTransport::new(),
            listener: Mutex::new(None),
            joined: AtomicBool::new(false),
            accepting,
            shutdown,
        });
        handlers::register(&node);

        info!(alias = %node.config.alias, account = account.short(), "node created");
        Ok(node)
    }

    /// Bind the listener, join the network through the bootstrap peer if one
    /// is configured, and resolve once inbound connections are accepted.
    pub async fn connect_and_listen(self: &Arc<Self>) -> NodeResult<SocketAddr> {
        if self.is_closed() {
            return Err(NodeError::ShutDown);
        }

        let listener = TcpListener::bind(&self.config.listen_addr).await?;
        let address = listener.local_addr()?;
        let own = {
            let mut info = self.info.write();
            info.address = address.to_string();
            info.clone()
        };
        self.roster.add(own);
        *self.listener.lock() = Some(listener);

        match &self.config.bootstrap_addr {
            Some(bootstrap) => {
                let connection = self.transport.dial(bootstrap.as_str()).await?;
                self.transport.send(
                    messages::GET_PEER_INFO_LIST,
                    &(),
                    Target::Connection(connection),
                    false,
                )?;
                info!(%bootstrap, "requested peer list");
            }
            None => {
                self.joined.store(true, Ordering::SeqCst);
                self.start_accepting();
            }
        }

        let mut accepting = self.accepting.subscribe();
        let ready = tokio::time::timeout(
            self.config.bootstrap_timeout,
            accepting.wait_for(|ready| *ready),
        )
        .await
        .map(|waited| waited.map(|_| ()));
        match ready {
            Ok(Ok(())) => Ok(address),
            Ok(Err(_)) => Err(NodeError::ShutDown),
            Err(_) => Err(NodeError::BootstrapTimeout(self.config.bootstrap_timeout)),
        }
    }

    /// Dial the most recent peers from the bootstrap roster, learn every
    /// account in it, announce ourselves and start accepting.
    async fn join_network(self: Arc<Self>, list: Vec<PeerInfo>) {
        let own = self.account().clone();
        for peer in dial_candidates(&list, &own, self.config.max_bootstrap_peers) {
            if let Err(e) = self.transport.dial(peer.address.as_str()).await {
                warn!(peer = %peer.alias, address = %peer.address, error = %e, "could not reach peer");
            }
        }

        for peer in list.into_iter().filter(|p| p.public_key != own) {
            self.ledger.add_account(&peer.alias, peer.public_key.clone());
            self.roster.add(peer);
        }

        let me = self.info();
        if let Err(e) = self
            .transport
            .send(messages::PRESENCE, &me, Target::Broadcast, true)
        {
            warn!(error = %e, "could not announce presence");
        }

        self.start_accepting();
        info!(
            peers = self.roster.len(),
            connections = self.transport.connection_count(),
            "joined network"
        );
    }

    fn start_accepting(&self) {
        let Some(listener) = self.listener.lock().take() else {
            return;
        };
        self.transport.spawn_listener(listener);
        self.accepting.send_replace(true);
    }

    // =========================================================================
    // GENESIS
    // =========================================================================

    /// Flood a genesis naming `stakeholders` and initialize from it locally.
    pub fn send_genesis(self: &Arc<Self>, stakeholders: Vec<AccountKey>) -> NodeResult<Genesis> {
        if self.lottery.get().is_some() {
            return Err(NodeError::GenesisAlreadyInitialized);
        }
        let genesis = Genesis {
            stakeholders,
            seed: rand::random(),
        };
        self.transport
            .send(messages::GENESIS, &genesis, Target::Broadcast, true)?;
        self.initialize_genesis(genesis.clone())?;
        Ok(genesis)
    }

    /// [`Node::send_genesis`] for every peer in the roster.
    pub fn send_genesis_to_roster(self: &Arc<Self>) -> NodeResult<Genesis> {
        let stakeholders = self
            .roster
            .list()
            .into_iter()
            .map(|peer| peer.public_key)
            .collect();
        self.send_genesis(stakeholders)
    }

    /// Endow the stakeholders, fix the lottery seed and start the slot clock.
    /// Only the first genesis counts.
    pub fn initialize_genesis(self: &Arc<Self>, genesis: Genesis) -> NodeResult<()> {
        let lottery = SlotLottery::new(genesis.seed, self.signer.clone());
        self.lottery
            .set(lottery)
            .map_err(|_| NodeError::GenesisAlreadyInitialized)?;

        for key in &genesis.stakeholders {
            if let Err(e) = self.ledger.add_money(key, GENESIS_ENDOWMENT) {
                warn!(account = key.short(), error = %e, "genesis endowment refused");
            }
        }
        info!(
            seed = genesis.seed,
            stakeholders = genesis.stakeholders.len(),
            "genesis initialized"
        );

        slots::spawn_slot_clock(self);
        self.retry_orphans();
        Ok(())
    }

    // =========================================================================
    // TRANSACTIONS
    // =========================================================================

    /// Pay `amount` to the account registered as `to_alias`.
    pub fn send_transaction(&self, to_alias: &str, amount: u64) -> NodeResult<SignedTransaction> {
        let to = self
            .ledger
            .alias_to_key(to_alias)
            .ok_or_else(|| NodeError::UnknownAlias(to_alias.to_string()))?;
        let transaction = Transaction::new(self.account().clone(), to, amount);
        if amount == 0 {
            return Err(LedgerError::NonPositiveAmount { id: transaction.id }.into());
        }
        let signed = self.signer.sign_transaction(transaction)?;
        self.submit_transaction(signed.clone())?;
        Ok(signed)
    }

    /// Store, queue and flood an already signed transaction.
    pub fn submit_transaction(&self, signed: SignedTransaction) -> NodeResult<()> {
        if !self.verifier.verify_transaction(&signed) {
            return Err(NodeError::InvalidTransactionSignature);
        }
        self.accept_transaction(signed.transaction.clone());
        self.transport
            .send(messages::TRANSACTION, &signed, Target::Broadcast, true)?;
        Ok(())
    }

    /// Remember `tx` and queue it unless the canonical chain already holds it.
    /// A new id may complete a parked block, so orphans are retried.
    fn accept_transaction(&self, tx: Transaction) {
        let id = tx.id.clone();
        let fresh = self.store.insert(tx);
        if fresh {
            TRANSACTIONS_RECEIVED.inc();
        }
        if self.ledger.is_applied(&id) {
            debug!(id, "transaction already settled, not queued");
        } else {
            self.pending.push(id);
        }
        if fresh && self.orphan_count() > 0 {
            self.retry_orphans();
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn alias(&self) -> &str {
        &self.config.alias
    }

    pub fn account(&self) -> &AccountKey {
        self.signer.account_key()
    }

    pub fn info(&self) -> PeerInfo {
        self.info.read().clone()
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn transport(&self) -> &GossipTransport {
        &self.transport
    }

    pub fn balance(&self, key: &AccountKey) -> u64 {
        self.ledger.balance(key)
    }

    /// Balance of the account registered as `alias`.
    pub fn balance_of(&self, alias: &str) -> Option<u64> {
        self.ledger.alias_to_key(alias).map(|key| self.ledger.balance(&key))
    }

    pub fn roster(&self) -> Vec<PeerInfo> {
        self.roster.list()
    }

    pub fn pending(&self) -> Vec<String> {
        self.pending.snapshot()
    }

    pub fn known_transaction(&self, id: &str) -> Option<Transaction> {
        self.store.get(id)
    }

    pub fn seed(&self) -> Option<u64> {
        self.lottery.get().map(SlotLottery::seed)
    }

    /// The local slot clock.
    pub fn current_slot(&self) -> u64 {
        self.slot.load(Ordering::SeqCst)
    }

    pub fn tip_hash(&self) -> Hash {
        self.tree.lock().current_hash()
    }

    pub fn chain_length(&self) -> u64 {
        self.tree.lock().current_length()
    }

    pub fn tree_len(&self) -> usize {
        self.tree.lock().len()
    }

    pub fn has_block(&self, hash: &Hash) -> bool {
        self.tree.lock().contains(hash)
    }

    pub fn canonical_transactions(&self) -> Vec<String> {
        self.tree.lock().canonical_transactions()
    }

    pub fn orphan_count(&self) -> usize {
        self.orphans.lock().len()
    }

    /// Tree dump headed by the alias.
    pub fn print_tree(&self) -> String {
        let rendered = format!("{}\n{}", self.config.alias, self.tree.lock().render());
        debug!("\n{rendered}");
        rendered
    }

    pub fn render_accounts(&self) -> String {
        self.ledger.render_accounts()
    }

    // =========================================================================
    // SHUTDOWN
    // =========================================================================

    /// Stop the slot clock and the accept loop and close every connection.
    pub fn close(&self) {
        if self.shutdown.send_replace(true) {
            return;
        }
        self.transport.shutdown();
        info!(alias = %self.config.alias, "node closed");
    }

    pub fn is_closed(&self) -> bool {
        *self.shutdown.borrow()
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("alias", &self.config.alias)
            .field("account", &self.account().short())
            .field("slot", &self.current_slot())
            .finish_non_exhaustive()
    }
}

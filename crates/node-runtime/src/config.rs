//! # Node Configuration
//!
//! Runtime parameters for one peer. Every field has a default and can be
//! overridden from the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use sc_02_fork_choice::{DEFAULT_ORPHAN_CAPACITY, DEFAULT_ORPHAN_RETENTION};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Alias must be non-empty and contain no whitespace, got {0:?}")]
    InvalidAlias(String),

    #[error("Slot duration must be positive")]
    ZeroSlotDuration,

    #[error("A key file needs a passphrase (set SC_KEY_PASSPHRASE)")]
    MissingPassphrase,
}

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Human-readable name announced to other peers.
    pub alias: String,
    /// Address to bind the gossip listener on. Port 0 picks a free port.
    pub listen_addr: String,
    /// Peer to bootstrap from; `None` starts a new network.
    pub bootstrap_addr: Option<String>,
    /// Wall-clock length of one slot.
    pub slot_duration: Duration,
    /// How many of the most recent roster entries to dial when joining.
    pub max_bootstrap_peers: usize,
    /// How long to wait for the bootstrap peer's roster.
    pub bootstrap_timeout: Duration,
    /// Parked blocks kept while waiting for a parent or transactions.
    pub orphan_capacity: usize,
    /// Slots a parked block may wait before it is dropped.
    pub orphan_retention: u64,
    /// Encrypted signing key; a fresh key is generated when absent.
    pub key_file: Option<PathBuf>,
    /// Passphrase for `key_file`.
    pub key_passphrase: Option<String>,
    /// Founder only: broadcast genesis for the whole roster after this delay.
    pub genesis_delay: Option<Duration>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            alias: "node".to_string(),
            listen_addr: "127.0.0.1:0".to_string(),
            bootstrap_addr: None,
            slot_duration: Duration::from_secs(1),
            max_bootstrap_peers: 10,
            bootstrap_timeout: Duration::from_secs(10),
            orphan_capacity: DEFAULT_ORPHAN_CAPACITY,
            orphan_retention: DEFAULT_ORPHAN_RETENTION,
            key_file: None,
            key_passphrase: None,
            genesis_delay: None,
        }
    }
}

impl NodeConfig {
    /// Defaults with `alias` set, the usual starting point in tests.
    pub fn with_alias(alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SC_ALIAS`: peer alias (default: node)
    /// - `SC_LISTEN_ADDR`: listen address (default: 127.0.0.1:0)
    /// - `SC_BOOTSTRAP_ADDR`: bootstrap peer (default: none)
    /// - `SC_SLOT_MILLIS`: slot length in milliseconds (default: 1000)
    /// - `SC_MAX_BOOTSTRAP_PEERS`: peers dialled on join (default: 10)
    /// - `SC_ORPHAN_CAPACITY` / `SC_ORPHAN_RETENTION`: orphan buffer bounds
    /// - `SC_KEY_FILE` / `SC_KEY_PASSPHRASE`: encrypted signing key
    /// - `SC_GENESIS_DELAY_SECS`: founder broadcasts genesis after this delay
    ///
    /// Unparseable numbers are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(alias) = env::var("SC_ALIAS") {
            config.alias = alias;
        }
        if let Ok(addr) = env::var("SC_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        config.bootstrap_addr = env::var("SC_BOOTSTRAP_ADDR")
            .ok()
            .filter(|addr| !addr.is_empty());
        if let Some(millis) = parse_var::<u64>("SC_SLOT_MILLIS") {
            config.slot_duration = Duration::from_millis(millis);
        }
        if let Some(peers) = parse_var("SC_MAX_BOOTSTRAP_PEERS") {
            config.max_bootstrap_peers = peers;
        }
        if let Some(capacity) = parse_var("SC_ORPHAN_CAPACITY") {
            config.orphan_capacity = capacity;
        }
        if let Some(retention) = parse_var("SC_ORPHAN_RETENTION") {
            config.orphan_retention = retention;
        }
        config.key_file = env::var("SC_KEY_FILE").ok().map(PathBuf::from);
        config.key_passphrase = env::var("SC_KEY_PASSPHRASE").ok();
        config.genesis_delay = parse_var::<u64>("SC_GENESIS_DELAY_SECS").map(Duration::from_secs);

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alias.is_empty() || self.alias.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidAlias(self.alias.clone()));
        }
        if self.slot_duration.is_zero() {
            return Err(ConfigError::ZeroSlotDuration);
        }
        if self.key_file.is_some() && self.key_passphrase.is_none() {
            return Err(ConfigError::MissingPassphrase);
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring unparseable environment variable");
            None
        }
    }
}

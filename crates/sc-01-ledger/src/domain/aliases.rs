//! Alias book: a bijection between human-readable names and account keys.

use std::collections::HashMap;

use shared_types::AccountKey;

/// Bidirectional alias map.
///
/// Registering an alias that already exists, or a key that already has an
/// alias, replaces the old pairing so both directions stay one-to-one.
#[derive(Debug, Default, Clone)]
pub struct AliasBook {
    by_alias: HashMap<String, AccountKey>,
    by_key: HashMap<AccountKey, String>,
}

impl AliasBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, alias: &str, key: AccountKey) {
        if let Some(old_key) = self.by_alias.remove(alias) {
            self.by_key.remove(&old_key);
        }
        if let Some(old_alias) = self.by_key.remove(&key) {
            self.by_alias.remove(&old_alias);
        }
        self.by_alias.insert(alias.to_string(), key.clone());
        self.by_key.insert(key, alias.to_string());
    }

    pub fn key_of(&self, alias: &str) -> Option<&AccountKey> {
        self.by_alias.get(alias)
    }

    pub fn alias_of(&self, key: &AccountKey) -> Option<&str> {
        self.by_key.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_alias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_alias.is_empty()
    }
}

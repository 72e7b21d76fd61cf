// ── Host key-value configuration store ──
//
// The host owns persistence of the token and interval. Core only needs
// string get/set/remove under a few well-known keys.

use dashmap::DashMap;

use crate::error::StoreError;

/// Key under which the bearer token is persisted.
pub const CONF_BEARER_TOKEN: &str = "bearer_token";
/// Key under which the update interval (minutes) is persisted.
pub const CONF_UPDATE_INTERVAL: &str = "update_interval";

/// String key-value persistence provided by the host.
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local store, for tests and ephemeral hosts.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    entries: DashMap<String, String>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

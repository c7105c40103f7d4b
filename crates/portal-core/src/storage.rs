//! Key/value storage seam and the records kept in it.
//!
//! The page uses two stores: a durable one for the remembered identifier and
//! a session-scoped one for the failed attempt counter. Both speak plain
//! string keys and string values.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::config::StorageKeys;
use crate::error::{Result, StoreError};

/// String key/value store.
pub trait KeyValueStore {
    /// Reads a value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a value. Returns whether it existed.
    fn remove(&self, key: &str) -> Result<bool>;
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.remove(key).is_some())
    }
}

/// Store that reports itself unavailable, standing in for a platform without
/// persistent storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(StoreError::Unavailable)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(StoreError::Unavailable)
    }

    fn remove(&self, _key: &str) -> Result<bool> {
        Err(StoreError::Unavailable)
    }
}

/// The remembered identifier, as persisted.
///
/// `remembered_username` is only ever `Some` while `remember_me` is true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedCredentialHint {
    pub remembered_username: Option<String>,
    pub remember_me: bool,
}

impl PersistedCredentialHint {
    /// A hint remembering `username`.
    pub fn remembering(username: impl Into<String>) -> Self {
        Self {
            remembered_username: Some(username.into()),
            remember_me: true,
        }
    }

    /// The username to prefill, if the hint is usable.
    pub fn prefill(&self) -> Option<&str> {
        match (&self.remembered_username, self.remember_me) {
            (Some(name), true) if !name.is_empty() => Some(name.as_str()),
            _ => None,
        }
    }
}

/// Reads and writes the [`PersistedCredentialHint`] under configured keys.
pub struct CredentialHints<'a> {
    store: &'a dyn KeyValueStore,
    keys: &'a StorageKeys,
}

impl<'a> CredentialHints<'a> {
    pub fn new(store: &'a dyn KeyValueStore, keys: &'a StorageKeys) -> Self {
        Self { store, keys }
    }

    /// Loads the hint. A flag other than `"true"` reads as unset.
    pub fn load(&self) -> Result<PersistedCredentialHint> {
        let remember_me = self.store.get(&self.keys.remember_me)?.as_deref() == Some("true");
        let remembered_username = if remember_me {
            self.store.get(&self.keys.remembered_username)?
        } else {
            None
        };

        Ok(PersistedCredentialHint {
            remembered_username,
            remember_me,
        })
    }

    /// Persists `username` with the remember flag set.
    pub fn save(&self, username: &str) -> Result<()> {
        self.store.set(&self.keys.remembered_username, username)?;
        self.store.set(&self.keys.remember_me, "true")?;
        debug!("Saved remembered username");
        Ok(())
    }

    /// Erases both keys.
    pub fn clear(&self) -> Result<()> {
        // flag first so a failure in between never leaves a name without it
        self.store.remove(&self.keys.remember_me)?;
        self.store.remove(&self.keys.remembered_username)?;
        debug!("Cleared remembered username");
        Ok(())
    }
}

/// Per-session failed login counter.
pub struct FailedAttempts<'a> {
    store: &'a dyn KeyValueStore,
    key: &'a str,
    threshold: u32,
}

impl<'a> FailedAttempts<'a> {
    /// `threshold` is the count a session may reach before it is suspicious.
    pub fn new(store: &'a dyn KeyValueStore, key: &'a str, threshold: u32) -> Self {
        Self {
            store,
            key,
            threshold,
        }
    }

    /// Current count. Missing or unparsable values read as zero.
    pub fn count(&self) -> u32 {
        match self.store.get(self.key) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or(0),
            Ok(None) => 0,
            Err(e) => {
                warn!("Failed to read failed attempt counter: {}", e);
                0
            }
        }
    }

    /// Increments the counter and returns the new count.
    pub fn record(&self) -> Result<u32> {
        let next = self.count().saturating_add(1);
        self.store.set(self.key, &next.to_string())?;
        Ok(next)
    }

    /// Resets the counter.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(self.key)?;
        Ok(())
    }

    /// Whether the session went past the threshold.
    pub fn is_suspicious(&self) -> bool {
        self.count() > self.threshold
    }
}

//! [`KeyValueStore`] backed by the database.

use portal_core::{KeyValueStore, StoreError};
use tracing::debug;

use crate::database::Database;

/// Durable key/value store for the login controller.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> portal_core::Result<Option<String>> {
        Ok(self.db.get_value(key)?)
    }

    fn set(&self, key: &str, value: &str) -> portal_core::Result<()> {
        debug!(key, "Writing stored value");
        Ok(self.db.set_value(key, value)?)
    }

    fn remove(&self, key: &str) -> portal_core::Result<bool> {
        self.db.delete_value(key).map_err(StoreError::from)
    }
}

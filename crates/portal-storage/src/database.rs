//! High-level database interface.

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::info;

use crate::error::{Result, StorageError};
use crate::pool::ConnectionPool;
use crate::repository::KvRepo;

/// High-level database interface for Portal.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    /// Create a new database in the default app data directory.
    pub fn new() -> Result<Self> {
        Self::with_path(Self::default_db_path()?)
    }

    /// Create a new database at a specific path.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening database at: {:?}", path);
        let pool = ConnectionPool::new(&path)?;

        Ok(Self { pool })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let pool = ConnectionPool::in_memory()?;
        Ok(Self { pool })
    }

    /// Get the default database path.
    pub fn default_db_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("portal.db"))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "portal", "portal")
            .ok_or_else(|| StorageError::Config("Could not determine app data directory".into()))
    }

    // === Key/value ===

    /// Get a value.
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let conn = self.pool.get()?;
        KvRepo::get(&conn, key)
    }

    /// Set a value.
    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.pool.get()?;
        KvRepo::set(&conn, key, value)
    }

    /// Delete a value.
    pub fn delete_value(&self, key: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        KvRepo::delete(&conn, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_values() {
        let db = Database::in_memory().unwrap();

        db.set_value("rememberedUsername", "a@b.com").unwrap();
        assert_eq!(
            db.get_value("rememberedUsername").unwrap().as_deref(),
            Some("a@b.com")
        );

        assert!(db.delete_value("rememberedUsername").unwrap());
        assert!(db.get_value("rememberedUsername").unwrap().is_none());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("portal.db");

        {
            let db = Database::with_path(&path).unwrap();
            db.set_value("rememberMe", "true").unwrap();
        }

        let db = Database::with_path(&path).unwrap();
        assert_eq!(db.get_value("rememberMe").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_overwrite_value() {
        let db = Database::in_memory().unwrap();
        db.set_value("rememberedUsername", "a@b.com").unwrap();
        db.set_value("rememberedUsername", "x@y.com").unwrap();
        assert_eq!(
            db.get_value("rememberedUsername").unwrap().as_deref(),
            Some("x@y.com")
        );
        assert!(!db.delete_value("missing").unwrap());
    }
}

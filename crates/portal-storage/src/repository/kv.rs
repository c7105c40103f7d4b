//! Key/value repository.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

/// Repository for the `kv_store` table.
pub struct KvRepo;

impl KvRepo {
    /// Get a value.
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        let value = conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(value)
    }

    /// Set a value (insert or update), stamping the write time.
    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        Ok(())
    }

    /// Delete a value.
    pub fn delete(conn: &Connection, key: &str) -> Result<bool> {
        let deleted = conn.execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
        Ok(deleted > 0)
    }
}

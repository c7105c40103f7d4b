//! Portal Storage - SQLite persistence layer.
//!
//! Durable key/value storage for the login form's remembered username.
//! [`SqliteStore`] plugs into [`portal_core::KeyValueStore`].
//!
//! # Example
//!
//! ```no_run
//! use portal_core::KeyValueStore;
//! use portal_storage::{Database, SqliteStore};
//!
//! let store = SqliteStore::new(Database::in_memory().unwrap());
//! store.set("rememberMe", "true").unwrap();
//! ```

mod database;
pub mod error;
mod pool;
pub mod repository;
mod schema;
mod store;

pub use database::Database;
pub use error::{Result, StorageError};
pub use pool::ConnectionPool;
pub use repository::KvRepo;
pub use store::SqliteStore;

//! SQLite storage bootstrap, pooling and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for reelbase core.
//! - Build the shared connection pool used by every repository.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Repositories never see a connection before migrations succeed.

use crate::config::ConfigError;
use thiserror::Error;

pub mod migrations;
mod open;
pub mod pool;

pub use open::{open_db, open_db_in_memory};
pub use pool::{open_pool, DbPool, PooledConn};

pub(crate) use open::configure_connection;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("invalid database config: {0}")]
    Config(#[from] ConfigError),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

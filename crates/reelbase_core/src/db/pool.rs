//! Shared SQLite connection pool.
//!
//! # Responsibility
//! - Build the `r2d2` pool every repository draws connections from.
//! - Apply connection pragmas on each new connection.
//! - Run migrations and a ping before handing the pool out.
//!
//! # Invariants
//! - Pool size and idle eviction come from [`DbConfig`]; nothing here retries.
//! - A `:memory:` DSN maps to one uniquely named shared-cache database, so
//!   every pooled connection sees the same data for the pool's lifetime.

use super::configure_connection;
use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use crate::config::DbConfig;
use log::{error, info};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use std::time::{Duration, Instant};
use uuid::Uuid;

const POOL_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

pub type DbPool = Pool<SqliteConnectionManager>;

pub type PooledConn = r2d2::PooledConnection<SqliteConnectionManager>;

#[derive(Debug)]
struct PragmaCustomizer {
    busy_timeout: Duration,
    wal: bool,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        configure_connection(conn, self.busy_timeout, self.wal)
    }
}

/// Opens the connection pool described by `config`.
///
/// # Errors
/// - `DbError::Config` when the config does not validate.
/// - `DbError::Pool` when initial connections cannot be established.
/// - `DbError::UnsupportedSchemaVersion` when the file was written by a newer build.
pub fn open_pool(config: &DbConfig) -> DbResult<DbPool> {
    let started_at = Instant::now();
    let mode = if config.is_memory() { "memory" } else { "file" };
    info!(
        "event=pool_open module=db status=start mode={mode} max_open={} max_idle={}",
        config.max_open_conns, config.max_idle_conns
    );

    match build_pool(config) {
        Ok(pool) => {
            info!(
                "event=pool_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(pool)
        }
        Err(err) => {
            error!(
                "event=pool_open module=db status=error mode={mode} duration_ms={} error_code=pool_open_failed error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn build_pool(config: &DbConfig) -> DbResult<DbPool> {
    config.validate()?;

    let memory = config.is_memory();
    let manager = if memory {
        let uri = format!("file:reelbase-{}?mode=memory&cache=shared", Uuid::new_v4());
        SqliteConnectionManager::file(uri).with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    } else {
        SqliteConnectionManager::file(config.dsn.trim())
    };

    // An in-memory database disappears with its last connection, so idle
    // eviction is disabled and at least one connection stays open.
    let (min_idle, idle_timeout) = if memory {
        (config.max_idle_conns.max(1), None)
    } else {
        (config.max_idle_conns, Some(config.max_idle_time))
    };

    let pool = Pool::builder()
        .max_size(config.max_open_conns)
        .min_idle(Some(min_idle))
        .idle_timeout(idle_timeout)
        .max_lifetime(None)
        .connection_timeout(POOL_CHECKOUT_TIMEOUT)
        .connection_customizer(Box::new(PragmaCustomizer {
            busy_timeout: config.effective_busy_timeout(),
            wal: !memory,
        }))
        .build(manager)?;

    let mut conn = pool.get()?;
    apply_migrations(&mut conn)?;
    ping(&conn)?;
    drop(conn);

    Ok(pool)
}

fn ping(conn: &Connection) -> DbResult<()> {
    conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))
        .map_err(DbError::from)?;
    Ok(())
}

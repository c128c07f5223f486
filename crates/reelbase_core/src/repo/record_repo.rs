//! Generic versioned-record repository over the shared pool.
//!
//! # Responsibility
//! - Provide create/get/update/delete/list for any [`Record`].
//! - Bound every call by a [`Deadline`] covering checkout and execution.
//! - Classify driver failures into [`RepoError`] kinds.
//!
//! # Invariants
//! - Updates only apply when the caller's version matches the stored one,
//!   and never retry.
//! - `id < 1` never reaches the store.
//! - List totals come from the same statement as the page rows.

use super::deadline::{Deadline, DeadlineGuard};
use super::error::{classify, RepoError, RepoResult};
use super::record::{Created, Record};
use crate::config::DEFAULT_QUERY_TIMEOUT;
use crate::db::DbPool;
use crate::model::RecordId;
use crate::query::builder::{self, Statement};
use crate::query::filters::{Filters, Metadata};
use crate::query::table::TableSpec;
use log::{debug, error, info, warn};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::marker::PhantomData;
use std::time::Duration;

/// Data access contract shared by every resource.
pub trait RecordRepository<R: Record> {
    /// Inserts `record` and writes the store-assigned id, creation time and
    /// version back into it.
    fn create(&self, record: &mut R) -> RepoResult<Created>;
    fn get(&self, id: RecordId) -> RepoResult<R>;
    /// Writes `record` if its version still matches the store and returns the
    /// new version, also stored on `record`.
    fn update(&self, record: &mut R) -> RepoResult<i32>;
    fn delete(&self, id: RecordId) -> RepoResult<()>;
    fn list(&self, filter: &R::Filter, filters: &Filters) -> RepoResult<(Vec<R>, Metadata)>;
}

/// SQLite-backed [`RecordRepository`].
///
/// Holds only the pool handle and its deadline; clones share the pool.
pub struct SqliteRepository<R> {
    pool: DbPool,
    timeout: Duration,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for SqliteRepository<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            timeout: self.timeout,
            _record: PhantomData,
        }
    }
}

impl<R> std::fmt::Debug for SqliteRepository<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRepository")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<R: Record> SqliteRepository<R> {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_QUERY_TIMEOUT,
            _record: PhantomData,
        }
    }

    /// Replaces the per-call deadline. Clone first for a one-off override.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Runs `op` on a pooled connection under a fresh deadline.
    fn run<T>(
        &self,
        event: &'static str,
        op: impl FnOnce(&Connection, &Deadline) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let deadline = Deadline::start(self.timeout);
        let result = self.checkout(&deadline).and_then(|conn| {
            let _guard = DeadlineGuard::install(&conn, &deadline);
            op(&conn, &deadline)
        });
        log_outcome(event, &R::TABLE, &deadline, &result);
        result
    }

    fn checkout(&self, deadline: &Deadline) -> RepoResult<crate::db::PooledConn> {
        let expired = || RepoError::DeadlineExceeded {
            timeout: deadline.timeout(),
        };
        let remaining = deadline.remaining().ok_or_else(expired)?;
        let conn = self.pool.get_timeout(remaining)?;
        if deadline.remaining().is_none() {
            return Err(expired());
        }
        Ok(conn)
    }

    /// Runs a single-row select and decodes it; no row is `NotFound`.
    pub(crate) fn fetch_one(&self, event: &'static str, stmt: Statement) -> RepoResult<R> {
        self.run(event, |conn, deadline| {
            let classify = |err| classify(err, &R::TABLE, deadline);
            let mut prepared = conn.prepare_cached(&stmt.sql).map_err(classify)?;
            prepared
                .query_row(params_from_iter(stmt.args.iter()), R::from_row)
                .map_err(classify)
        })
    }
}

impl<R: Record> RecordRepository<R> for SqliteRepository<R> {
    fn create(&self, record: &mut R) -> RepoResult<Created> {
        let stmt = builder::insert(&R::TABLE, record.write_values());
        let created = self.run("record_create", |conn, deadline| {
            let classify = |err| classify(err, &R::TABLE, deadline);
            let mut prepared = conn.prepare_cached(&stmt.sql).map_err(classify)?;
            prepared
                .query_row(params_from_iter(stmt.args.iter()), |row| {
                    Ok(Created {
                        id: row.get(0)?,
                        created_at: row.get(1)?,
                        version: row.get(2)?,
                    })
                })
                .map_err(classify)
        })?;

        record.assign_identity(&created);
        Ok(created)
    }

    fn get(&self, id: RecordId) -> RepoResult<R> {
        if id < 1 {
            return Err(RepoError::NotFound);
        }
        self.fetch_one("record_get", builder::select_by_id(&R::TABLE, id))
    }

    fn update(&self, record: &mut R) -> RepoResult<i32> {
        let stmt = builder::update(
            &R::TABLE,
            record.write_values(),
            record.id(),
            record.version(),
        );
        let version = self.run("record_update", |conn, deadline| {
            let classify = |err| classify(err, &R::TABLE, deadline);
            let mut prepared = conn.prepare_cached(&stmt.sql).map_err(classify)?;
            prepared
                .query_row(params_from_iter(stmt.args.iter()), |row| {
                    row.get::<_, i32>(0)
                })
                .optional()
                .map_err(classify)?
                .ok_or(RepoError::EditConflict)
        })?;

        record.set_version(version);
        Ok(version)
    }

    fn delete(&self, id: RecordId) -> RepoResult<()> {
        if id < 1 {
            return Err(RepoError::NotFound);
        }
        let stmt = builder::delete(&R::TABLE, id);
        self.run("record_delete", |conn, deadline| {
            let classify = |err| classify(err, &R::TABLE, deadline);
            let mut prepared = conn.prepare_cached(&stmt.sql).map_err(classify)?;
            let affected = prepared
                .execute(params_from_iter(stmt.args.iter()))
                .map_err(classify)?;
            if affected == 0 {
                return Err(RepoError::NotFound);
            }
            Ok(())
        })
    }

    fn list(&self, filter: &R::Filter, filters: &Filters) -> RepoResult<(Vec<R>, Metadata)> {
        let predicates = R::predicates(filter);
        let stmt = builder::list(&R::TABLE, &predicates, filters).map_err(|err| {
            warn!(
                "event=record_list module=repo table={} status=error error_code=invalid_filter error={err}",
                R::TABLE.name
            );
            RepoError::from(err)
        })?;

        let (records, total_records) = self.run("record_list", |conn, deadline| {
            let classify = |err| classify(err, &R::TABLE, deadline);
            let mut prepared = conn.prepare_cached(&stmt.sql).map_err(classify)?;
            let mut rows = prepared
                .query(params_from_iter(stmt.args.iter()))
                .map_err(classify)?;

            let mut records = Vec::new();
            let mut total_records = 0_u64;
            while let Some(row) = rows.next().map_err(classify)? {
                let total: i64 = row.get("total_records").map_err(classify)?;
                total_records = u64::try_from(total).unwrap_or_default();
                records.push(R::from_row(row).map_err(classify)?);
            }
            Ok((records, total_records))
        })?;

        let metadata = Metadata::calculate(total_records, filters.page, filters.page_size);
        Ok((records, metadata))
    }
}

fn log_outcome<T>(
    event: &'static str,
    table: &TableSpec,
    deadline: &Deadline,
    result: &RepoResult<T>,
) {
    let duration_ms = deadline.elapsed().as_millis();
    let table = table.name;
    match result {
        Ok(_) => debug!(
            "event={event} module=repo table={table} status=ok duration_ms={duration_ms}"
        ),
        Err(RepoError::NotFound) => debug!(
            "event={event} module=repo table={table} status=not_found duration_ms={duration_ms}"
        ),
        Err(err @ (RepoError::EditConflict | RepoError::DuplicateValue { .. })) => info!(
            "event={event} module=repo table={table} status=conflict duration_ms={duration_ms} error_code={}",
            err.code()
        ),
        Err(err) => error!(
            "event={event} module=repo table={table} status=error duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
    }
}

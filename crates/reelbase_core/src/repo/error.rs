//! Repository error taxonomy.
//!
//! # Responsibility
//! - Collapse store failures into the four kinds callers branch on.
//! - Keep infrastructure failures opaque but inspectable.
//!
//! # Invariants
//! - A deadline overrun is never reported as `NotFound` or `EditConflict`.
//! - A busy or locked failure after the deadline passed is a deadline overrun.
//! - Unique violations surface as `DuplicateValue` only for columns the
//!   table designates; others stay `Sqlite`.

use super::deadline::Deadline;
use crate::db::DbError;
use crate::query::filters::FilterError;
use crate::query::table::TableSpec;
use rusqlite::ErrorCode;
use std::time::Duration;
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Outcome category for comparing errors without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    EditConflict,
    DuplicateValue,
    Infrastructure,
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("record not found")]
    NotFound,
    #[error("unable to update the record due to an edit conflict, please try again")]
    EditConflict,
    #[error("a record with this {field} already exists")]
    DuplicateValue { field: &'static str },
    #[error("deadline of {}ms exceeded", .timeout.as_millis())]
    DeadlineExceeded { timeout: Duration },
    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("invalid list filter: {0}")]
    Filter(#[from] FilterError),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::EditConflict => ErrorKind::EditConflict,
            Self::DuplicateValue { .. } => ErrorKind::DuplicateValue,
            Self::DeadlineExceeded { .. }
            | Self::Sqlite(_)
            | Self::Pool(_)
            | Self::Db(_)
            | Self::Filter(_)
            | Self::InvalidData(_) => ErrorKind::Infrastructure,
        }
    }

    /// Stable code for log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::EditConflict => "edit_conflict",
            Self::DuplicateValue { .. } => "duplicate_value",
            Self::DeadlineExceeded { .. } => "deadline_exceeded",
            Self::Sqlite(_) => "sqlite",
            Self::Pool(_) => "pool",
            Self::Db(_) => "db",
            Self::Filter(_) => "invalid_filter",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

/// Maps a driver error raised while running a statement against `table`.
pub(crate) fn classify(err: rusqlite::Error, table: &TableSpec, deadline: &Deadline) -> RepoError {
    let overran = match err.sqlite_error_code() {
        Some(ErrorCode::OperationInterrupted) => true,
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => deadline.remaining().is_none(),
        _ => false,
    };
    if overran {
        return RepoError::DeadlineExceeded {
            timeout: deadline.timeout(),
        };
    }

    match err {
        rusqlite::Error::QueryReturnedNoRows => RepoError::NotFound,
        rusqlite::Error::SqliteFailure(ffi_err, Some(message))
            if ffi_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            match duplicate_field(table, &message) {
                Some(field) => RepoError::DuplicateValue { field },
                None => RepoError::Sqlite(rusqlite::Error::SqliteFailure(ffi_err, Some(message))),
            }
        }
        decode @ (rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::IntegralValueOutOfRange(..)) => RepoError::InvalidData(decode.to_string()),
        other => RepoError::Sqlite(other),
    }
}

/// Parses `UNIQUE constraint failed: users.email[, users.other]`.
fn duplicate_field(table: &TableSpec, message: &str) -> Option<&'static str> {
    let columns = message.strip_prefix("UNIQUE constraint failed: ")?;
    columns
        .split(", ")
        .filter_map(|qualified| qualified.split_once('.'))
        .filter(|(owner, _)| *owner == table.name)
        .find_map(|(_, column)| table.unique_field(column))
}

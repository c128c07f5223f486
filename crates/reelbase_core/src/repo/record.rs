//! Mapping between record types and their tables.

use crate::model::RecordId;
use crate::query::builder::Predicate;
use crate::query::table::TableSpec;
use rusqlite::types::Value;
use rusqlite::Row;

/// Store-assigned fields returned by an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Created {
    pub id: RecordId,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub version: i32,
}

/// A versioned resource persisted in one table.
pub trait Record: Sized {
    const TABLE: TableSpec;

    /// Resource-specific list predicates.
    type Filter;

    fn id(&self) -> RecordId;
    fn version(&self) -> i32;
    fn set_version(&mut self, version: i32);
    fn assign_identity(&mut self, created: &Created);

    /// Values for `TABLE.write_columns`, in the same order.
    fn write_values(&self) -> Vec<Value>;

    /// Decodes a row selected with `TABLE.select_list()`.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn predicates(filter: &Self::Filter) -> Vec<Predicate>;
}

//! Static table metadata for the managed resources.

use super::filters::{FilterError, Filters, SortClause};
use crate::model::movie::MOVIE_SORT_SAFELIST;
use crate::model::user::USER_SORT_SAFELIST;

/// Column layout and query policy for one resource table.
///
/// Every table carries `id`, `created_at` and `version` in addition to its
/// writable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    /// Columns written on insert and update, in bind order.
    pub write_columns: &'static [&'static str],
    pub sort_safelist: &'static [&'static str],
    /// External-content FTS5 table indexing this table, if any.
    pub fts_table: Option<&'static str>,
    /// `(column, field)` pairs whose unique violations are reported to callers.
    pub unique_fields: &'static [(&'static str, &'static str)],
}

pub const MOVIES: TableSpec = TableSpec {
    name: "movies",
    write_columns: &["title", "year", "runtime", "genres"],
    sort_safelist: MOVIE_SORT_SAFELIST,
    fts_table: Some("movies_fts"),
    unique_fields: &[],
};

pub const USERS: TableSpec = TableSpec {
    name: "users",
    write_columns: &["name", "email", "password_hash", "activated"],
    sort_safelist: USER_SORT_SAFELIST,
    fts_table: Some("users_fts"),
    unique_fields: &[("email", "email")],
};

const STORE_COLUMNS: &[&str] = &["id", "created_at", "version"];

impl TableSpec {
    /// Columns returned by reads: store columns first, then writable ones.
    pub fn select_list(&self) -> String {
        let mut columns = vec!["id", "created_at"];
        columns.extend_from_slice(self.write_columns);
        columns.push("version");
        columns.join(", ")
    }

    pub fn has_column(&self, column: &str) -> bool {
        STORE_COLUMNS.contains(&column) || self.write_columns.contains(&column)
    }

    /// Resolves the allow-listed sort in `filters` to a column of this table.
    pub fn sort_clause(&self, filters: &Filters) -> Result<SortClause, FilterError> {
        let sort = filters.sort_clause()?;
        if !self.has_column(sort.column()) {
            return Err(FilterError::UnknownSortColumn {
                table: self.name,
                column: sort.column(),
            });
        }
        Ok(sort)
    }

    /// Maps a column named in a unique-constraint message to its caller-facing field.
    pub fn unique_field(&self, column: &str) -> Option<&'static str> {
        self.unique_fields
            .iter()
            .find(|(candidate, _)| *candidate == column)
            .map(|(_, field)| *field)
    }
}

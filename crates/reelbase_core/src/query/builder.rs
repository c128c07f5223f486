//! Parameterized statement construction.
//!
//! # Responsibility
//! - Render insert/select/update/delete/list SQL for a [`TableSpec`].
//! - Collect every data value as a bound argument.
//!
//! # Invariants
//! - Identifiers in the SQL text come from `TableSpec` or a validated
//!   [`SortClause`]; nothing caller-supplied is interpolated.
//! - List statements always end in a deterministic order and `LIMIT`/`OFFSET`.
//! - Empty predicates are vacuous and keep the statement shape unchanged.

use super::filters::{FilterError, Filters, SortClause};
use super::fts::match_expression;
use super::table::TableSpec;
use crate::model::RecordId;
use rusqlite::types::Value;

/// SQL text plus its positional arguments (`?1`, `?2`, …).
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Statement {
    fn new() -> Self {
        Self {
            sql: String::new(),
            args: Vec::new(),
        }
    }

    /// Binds `value` and returns its placeholder.
    fn bind(&mut self, value: Value) -> String {
        self.args.push(value);
        format!("?{}", self.args.len())
    }
}

/// A list filter condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Every whitespace-separated term must match the table's FTS index.
    FullText { text: String },
    /// The JSON array in `column` must contain every value.
    ContainsAll {
        column: &'static str,
        values: Vec<String>,
    },
}

/// `INSERT … RETURNING id, created_at, version`.
pub fn insert(table: &TableSpec, values: Vec<Value>) -> Statement {
    debug_assert_eq!(values.len(), table.write_columns.len());

    let mut stmt = Statement::new();
    let placeholders = values
        .into_iter()
        .map(|value| stmt.bind(value))
        .collect::<Vec<_>>();

    stmt.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING id, created_at, version;",
        table.name,
        table.write_columns.join(", "),
        placeholders.join(", ")
    );
    stmt
}

pub fn select_by_id(table: &TableSpec, id: RecordId) -> Statement {
    select_by(table, "id", Value::Integer(id))
}

/// Single-row lookup on an equality match against `column`.
pub fn select_by(table: &TableSpec, column: &'static str, value: Value) -> Statement {
    debug_assert!(table.has_column(column));

    let mut stmt = Statement::new();
    let placeholder = stmt.bind(value);
    stmt.sql = format!(
        "SELECT {} FROM {} WHERE {column} = {placeholder};",
        table.select_list(),
        table.name
    );
    stmt
}

/// Versioned update: matches only when the stored version equals `version`.
///
/// Returns the incremented version via `RETURNING`; no row back means the
/// record was deleted or changed since it was read.
pub fn update(table: &TableSpec, values: Vec<Value>, id: RecordId, version: i32) -> Statement {
    debug_assert_eq!(values.len(), table.write_columns.len());

    let mut stmt = Statement::new();
    let assignments = table
        .write_columns
        .iter()
        .zip(values)
        .map(|(column, value)| format!("{column} = {}", stmt.bind(value)))
        .collect::<Vec<_>>();
    let id_placeholder = stmt.bind(Value::Integer(id));
    let version_placeholder = stmt.bind(Value::Integer(i64::from(version)));

    stmt.sql = format!(
        "UPDATE {} SET {}, version = version + 1 WHERE id = {id_placeholder} AND version = {version_placeholder} RETURNING version;",
        table.name,
        assignments.join(", ")
    );
    stmt
}

pub fn delete(table: &TableSpec, id: RecordId) -> Statement {
    let mut stmt = Statement::new();
    let placeholder = stmt.bind(Value::Integer(id));
    stmt.sql = format!("DELETE FROM {} WHERE id = {placeholder};", table.name);
    stmt
}

/// Filtered, sorted and paginated listing with a windowed total count.
///
/// The first selected column is `total_records`, the match count before
/// `LIMIT`/`OFFSET` apply.
///
/// # Errors
/// - `FilterError` when paging is out of range, the sort key is not
///   allow-listed, or a predicate does not fit `table`.
pub fn list(
    table: &TableSpec,
    predicates: &[Predicate],
    filters: &Filters,
) -> Result<Statement, FilterError> {
    filters.check_bounds()?;
    let sort = table.sort_clause(filters)?;

    let mut stmt = Statement::new();
    let mut sql = format!(
        "SELECT count(*) OVER() AS total_records, {} FROM {} WHERE 1 = 1",
        table.select_list(),
        table.name
    );

    for predicate in predicates {
        sql.push_str(" AND ");
        sql.push_str(&render_predicate(table, predicate, &mut stmt)?);
    }

    sql.push_str(&order_by(&sort));

    let limit = stmt.bind(Value::Integer(i64::from(filters.limit())));
    let offset = stmt.bind(Value::Integer(
        i64::try_from(filters.offset()).unwrap_or(i64::MAX),
    ));
    sql.push_str(&format!(" LIMIT {limit} OFFSET {offset};"));

    stmt.sql = sql;
    Ok(stmt)
}

fn render_predicate(
    table: &TableSpec,
    predicate: &Predicate,
    stmt: &mut Statement,
) -> Result<String, FilterError> {
    match predicate {
        Predicate::FullText { text } => {
            let fts = table
                .fts_table
                .ok_or(FilterError::NoFullTextIndex { table: table.name })?;
            let expr = match_expression(text).map_or(Value::Null, Value::Text);
            let p = stmt.bind(expr);
            Ok(format!(
                "({p} IS NULL OR {table}.id IN (SELECT rowid FROM {fts} WHERE {fts} MATCH {p}))",
                table = table.name
            ))
        }
        Predicate::ContainsAll { column, values } => {
            debug_assert!(table.has_column(column));
            let wanted = serde_json::Value::from(values.clone()).to_string();
            let p = stmt.bind(Value::Text(wanted));
            Ok(format!(
                "({p} = '[]' OR NOT EXISTS (SELECT 1 FROM json_each({p}) AS wanted \
                 WHERE wanted.value NOT IN (SELECT value FROM json_each({table}.{column}))))",
                table = table.name
            ))
        }
    }
}

fn order_by(sort: &SortClause) -> String {
    let column = sort.column();
    let direction = sort.direction().as_sql();
    if column == "id" {
        format!(" ORDER BY id {direction}")
    } else {
        format!(" ORDER BY {column} {direction}, id ASC")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::table::{MOVIES, USERS};

    fn movie_values() -> Vec<Value> {
        vec![
            Value::Text("Up".to_string()),
            Value::Integer(2009),
            Value::Integer(96),
            Value::Text("[\"animation\"]".to_string()),
        ]
    }

    #[test]
    fn insert_binds_every_write_column() {
        let stmt = insert(&MOVIES, movie_values());
        assert_eq!(
            stmt.sql,
            "INSERT INTO movies (title, year, runtime, genres) VALUES (?1, ?2, ?3, ?4) RETURNING id, created_at, version;"
        );
        assert_eq!(stmt.args.len(), 4);
    }

    #[test]
    fn update_checks_version_and_increments_it() {
        let stmt = update(&MOVIES, movie_values(), 7, 3);
        assert!(stmt.sql.contains("version = version + 1"));
        assert!(stmt.sql.ends_with("WHERE id = ?5 AND version = ?6 RETURNING version;"));
        assert_eq!(stmt.args[4], Value::Integer(7));
        assert_eq!(stmt.args[5], Value::Integer(3));
    }

    #[test]
    fn select_by_binds_lookup_value() {
        let stmt = select_by(&USERS, "email", Value::Text("a@b.c".to_string()));
        assert!(stmt.sql.ends_with("FROM users WHERE email = ?1;"));
        assert_eq!(stmt.args, vec![Value::Text("a@b.c".to_string())]);
    }

    #[test]
    fn list_with_blank_predicates_keeps_shape_and_binds_nothing_unsafe() {
        let filters = Filters::new(MOVIES.sort_safelist).with_page(2, 10);
        let predicates = [
            Predicate::FullText {
                text: "   ".to_string(),
            },
            Predicate::ContainsAll {
                column: "genres",
                values: Vec::new(),
            },
        ];
        let stmt = list(&MOVIES, &predicates, &filters).unwrap();

        assert!(stmt.sql.starts_with("SELECT count(*) OVER() AS total_records, id,"));
        assert!(stmt.sql.ends_with(" ORDER BY id ASC LIMIT ?3 OFFSET ?4;"));
        assert_eq!(
            stmt.args,
            vec![
                Value::Null,
                Value::Text("[]".to_string()),
                Value::Integer(10),
                Value::Integer(10),
            ]
        );
    }

    #[test]
    fn list_sorts_by_column_with_id_tie_break() {
        let filters = Filters::new(MOVIES.sort_safelist).with_sort("-year");
        let stmt = list(&MOVIES, &[], &filters).unwrap();
        assert!(stmt.sql.contains(" ORDER BY year DESC, id ASC LIMIT ?1 OFFSET ?2;"));
    }

    #[test]
    fn list_never_interpolates_user_text() {
        let filters = Filters::new(MOVIES.sort_safelist);
        let predicate = Predicate::FullText {
            text: "'; DROP TABLE movies; --".to_string(),
        };
        let stmt = list(&MOVIES, &[predicate], &filters).unwrap();
        assert!(!stmt.sql.contains("DROP"));
        assert!(matches!(&stmt.args[0], Value::Text(expr) if expr.contains("DROP")));
    }

    #[test]
    fn list_rejects_unsafe_sort_and_foreign_columns() {
        let unsafe_sort = Filters::new(MOVIES.sort_safelist).with_sort("title desc");
        assert!(matches!(
            list(&MOVIES, &[], &unsafe_sort),
            Err(FilterError::UnsafeSort { .. })
        ));

        let foreign = Filters::new(MOVIES.sort_safelist).with_sort("-year");
        assert_eq!(
            list(&USERS, &[], &foreign),
            Err(FilterError::UnknownSortColumn {
                table: "users",
                column: "year",
            })
        );
    }

    #[test]
    fn list_rejects_out_of_range_paging() {
        let filters = Filters::new(MOVIES.sort_safelist).with_page(0, 20);
        assert_eq!(
            list(&MOVIES, &[], &filters),
            Err(FilterError::PageOutOfRange { page: 0 })
        );
    }
}

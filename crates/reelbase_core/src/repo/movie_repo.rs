//! Movie persistence.
//!
//! Genres live in a JSON array column; title search goes through `movies_fts`.

use super::record::{Created, Record};
use super::record_repo::SqliteRepository;
use crate::model::movie::{Movie, MovieFilter};
use crate::model::RecordId;
use crate::query::builder::Predicate;
use crate::query::table::{TableSpec, MOVIES};
use rusqlite::types::{Type, Value};
use rusqlite::Row;

pub type MovieRepository = SqliteRepository<Movie>;

impl Record for Movie {
    const TABLE: TableSpec = MOVIES;
    type Filter = MovieFilter;

    fn id(&self) -> RecordId {
        self.id
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }

    fn assign_identity(&mut self, created: &Created) {
        self.id = created.id;
        self.created_at = created.created_at;
        self.version = created.version;
    }

    fn write_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.title.clone()),
            Value::Integer(i64::from(self.year)),
            Value::Integer(i64::from(self.runtime.minutes())),
            Value::Text(serde_json::Value::from(self.genres.clone()).to_string()),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let genres_idx = row.as_ref().column_index("genres")?;
        let genres_json: String = row.get(genres_idx)?;
        let genres = serde_json::from_str(&genres_json).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(genres_idx, Type::Text, Box::new(err))
        })?;

        Ok(Self {
            id: row.get("id")?,
            created_at: row.get("created_at")?,
            title: row.get("title")?,
            year: row.get("year")?,
            runtime: row.get("runtime")?,
            genres,
            version: row.get("version")?,
        })
    }

    fn predicates(filter: &MovieFilter) -> Vec<Predicate> {
        vec![
            Predicate::FullText {
                text: filter.title.clone(),
            },
            Predicate::ContainsAll {
                column: "genres",
                values: filter.genres.clone(),
            },
        ]
    }
}

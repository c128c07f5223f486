//! User persistence and lookup by email.

use super::error::{RepoError, RepoResult};
use super::record::{Created, Record};
use super::record_repo::{RecordRepository, SqliteRepository};
use crate::model::user::{User, UserFilter};
use crate::model::RecordId;
use crate::query::builder::{self, Predicate};
use crate::query::table::{TableSpec, USERS};
use rusqlite::types::Value;
use rusqlite::Row;

pub type UserRepository = SqliteRepository<User>;

impl Record for User {
    const TABLE: TableSpec = USERS;
    type Filter = UserFilter;

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
            Value::Text(self.name.clone()),
            Value::Text(self.email.clone()),
            Value::Blob(self.password_hash.clone()),
            Value::Integer(i64::from(self.activated)),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            created_at: row.get("created_at")?,
            name: row.get("name")?,
            email: row.get("email")?,
            password_hash: row.get("password_hash")?,
            activated: row.get("activated")?,
            version: row.get("version")?,
        })
    }

    fn predicates(filter: &UserFilter) -> Vec<Predicate> {
        vec![Predicate::FullText {
            text: filter.name.clone(),
        }]
    }
}

/// Lookups users support beyond the shared record contract.
pub trait UserLookup: RecordRepository<User> {
    /// Finds a user by email, ignoring ASCII case.
    fn get_by_email(&self, email: &str) -> RepoResult<User>;
}

impl UserLookup for SqliteRepository<User> {
    fn get_by_email(&self, email: &str) -> RepoResult<User> {
        if email.is_empty() {
            return Err(RepoError::NotFound);
        }
        self.fetch_one(
            "user_get_by_email",
            builder::select_by(&USERS, "email", Value::Text(email.to_string())),
        )
    }
}

//! Repository layer over the shared connection pool.
//!
//! # Responsibility
//! - Expose the per-resource data access contract ([`RecordRepository`]).
//! - Keep SQL, deadlines and error classification inside the persistence boundary.
//!
//! # Invariants
//! - Callers only ever see [`RepoError`]; its [`ErrorKind`] is one of
//!   `NotFound`, `EditConflict`, `DuplicateValue` or `Infrastructure`.
//! - Repositories are cheap to clone and safe to share across threads.

pub mod deadline;
pub mod error;
pub mod movie_repo;
pub mod record;
pub mod record_repo;
pub mod user_repo;

pub use deadline::Deadline;
pub use error::{ErrorKind, RepoError, RepoResult};
pub use movie_repo::MovieRepository;
pub use record::{Created, Record};
pub use record_repo::{RecordRepository, SqliteRepository};
pub use user_repo::{UserLookup, UserRepository};

use crate::config::DbConfig;
use crate::db::{open_pool, DbPool, DbResult};
use std::time::Duration;

/// One repository per resource, all drawing from the same pool.
#[derive(Debug, Clone)]
pub struct Repositories {
    pub movies: MovieRepository,
    pub users: UserRepository,
}

impl Repositories {
    pub fn new(pool: DbPool, timeout: Duration) -> Self {
        Self {
            movies: MovieRepository::new(pool.clone()).with_timeout(timeout),
            users: UserRepository::new(pool).with_timeout(timeout),
        }
    }

    /// Opens the pool described by `config` and applies its query timeout.
    pub fn open(config: &DbConfig) -> DbResult<Self> {
        let pool = open_pool(config)?;
        Ok(Self::new(pool, config.query_timeout))
    }
}

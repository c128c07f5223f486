//! Core data access for reelbase.
//! Versioned movie and user records over a pooled SQLite store, with
//! optimistic concurrency, filtered listing and per-call deadlines.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{ConfigError, DbConfig, LogConfig};
pub use db::{open_pool, DbError, DbPool, DbResult};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::movie::{Movie, MovieFilter, MovieUpdate, NewMovie};
pub use model::runtime::Runtime;
pub use model::user::{NewUser, User, UserFilter, UserUpdate};
pub use model::validation::{ValidationErrors, Validator};
pub use model::RecordId;
pub use query::filters::{FilterError, Filters, Metadata};
pub use repo::{
    Created, ErrorKind, MovieRepository, RecordRepository, RepoError, RepoResult, Repositories,
    SqliteRepository, UserLookup, UserRepository,
};
pub use service::movie_service::MovieService;
pub use service::user_service::UserService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

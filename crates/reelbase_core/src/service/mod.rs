//! Use-case services over the repositories.
//!
//! # Responsibility
//! - Compose read, merge, validate and write steps per resource.
//! - Report field validation failures separately from store outcomes.
//!
//! # Invariants
//! - Records are validated before every create and update.
//! - Services never retry a conflicting update.

pub mod movie_service;
pub mod user_service;

use crate::model::validation::ValidationErrors;
use crate::query::filters::FilterError;
use crate::repo::{ErrorKind, RepoError};
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl ServiceError {
    /// Store outcome kind; `None` for input that never reached the store.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Validation(_) | Self::Filter(_) => None,
            Self::Repo(err) => Some(err.kind()),
        }
    }
}

/// Rejects an update up front when the caller read an older version.
pub(crate) fn check_expected_version(
    expected_version: Option<i32>,
    stored_version: i32,
) -> Result<(), RepoError> {
    match expected_version {
        Some(expected) if expected != stored_version => Err(RepoError::EditConflict),
        _ => Ok(()),
    }
}

//! Movie use-case service.

use super::{check_expected_version, ServiceResult};
use crate::model::movie::{Movie, MovieFilter, MovieUpdate, NewMovie};
use crate::model::validation::{ValidationErrors, Validator};
use crate::model::RecordId;
use crate::query::filters::{Filters, Metadata};
use crate::repo::{Record, RecordRepository};

pub struct MovieService<R: RecordRepository<Movie>> {
    repo: R,
}

impl<R: RecordRepository<Movie>> MovieService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and stores a new movie, returning it with store-assigned fields.
    pub fn create_movie(&self, input: NewMovie) -> ServiceResult<Movie> {
        let mut movie = Movie::from_new(input);
        validate(&movie)?;
        self.repo.create(&mut movie)?;
        Ok(movie)
    }

    pub fn get_movie(&self, id: RecordId) -> ServiceResult<Movie> {
        Ok(self.repo.get(id)?)
    }

    /// Applies `patch` to the stored movie.
    ///
    /// # Errors
    /// - `EditConflict` when `expected_version` is stale or another writer
    ///   updated the movie between the read and the write.
    /// - `Validation` when the merged movie breaks a business rule.
    pub fn update_movie(
        &self,
        id: RecordId,
        patch: MovieUpdate,
        expected_version: Option<i32>,
    ) -> ServiceResult<Movie> {
        let mut movie = self.repo.get(id)?;
        check_expected_version(expected_version, movie.version)?;

        movie.apply_update(patch);
        validate(&movie)?;
        self.repo.update(&mut movie)?;
        Ok(movie)
    }

    pub fn delete_movie(&self, id: RecordId) -> ServiceResult<()> {
        Ok(self.repo.delete(id)?)
    }

    pub fn list_movies(
        &self,
        filter: &MovieFilter,
        filters: &Filters,
    ) -> ServiceResult<(Vec<Movie>, Metadata)> {
        let mut v = Validator::new();
        filters.validate(&mut v);
        v.finish()?;
        Movie::TABLE.sort_clause(filters)?;
        Ok(self.repo.list(filter, filters)?)
    }
}

fn validate(movie: &Movie) -> Result<(), ValidationErrors> {
    let mut v = Validator::new();
    movie.validate(&mut v);
    v.finish()
}

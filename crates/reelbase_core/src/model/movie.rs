//! Movie record model.
//!
//! # Responsibility
//! - Define the persisted movie shape plus its create and patch inputs.
//! - Merge partial updates and validate business rules.
//!
//! # Invariants
//! - `from_new` never sets `id`, `created_at` or `version`.
//! - `apply_update` only touches fields present in the patch.

use super::runtime::Runtime;
use super::validation::{unique, Validator};
use super::RecordId;
use chrono::Datelike;
use serde::{Deserialize, Serialize};

pub const MOVIE_SORT_SAFELIST: &[&str] = &[
    "id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime",
];

const TITLE_MAX_BYTES: usize = 500;
const EARLIEST_YEAR: i32 = 1888;
const MAX_GENRES: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Movie {
    pub id: RecordId,
    /// Epoch milliseconds; internal only.
    #[serde(skip)]
    pub created_at: i64,
    pub title: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub year: i32,
    #[serde(skip_serializing_if = "Runtime::is_zero")]
    pub runtime: Runtime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    pub version: i32,
}

/// Input for creating a movie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewMovie {
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Vec<String>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MovieUpdate {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<Runtime>,
    pub genres: Option<Vec<String>>,
}

/// List predicates for movies. Empty values match every movie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieFilter {
    /// Plain-text title query; all terms must match.
    pub title: String,
    /// Every listed genre must be present on the movie.
    pub genres: Vec<String>,
}

impl Movie {
    pub fn from_new(input: NewMovie) -> Self {
        Self {
            title: input.title,
            year: input.year,
            runtime: input.runtime,
            genres: input.genres,
            ..Self::default()
        }
    }

    pub fn apply_update(&mut self, input: MovieUpdate) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(year) = input.year {
            self.year = year;
        }
        if let Some(runtime) = input.runtime {
            self.runtime = runtime;
        }
        if let Some(genres) = input.genres {
            self.genres = genres;
        }
    }

    pub fn validate(&self, v: &mut Validator) {
        self.validate_for_year(v, chrono::Utc::now().year());
    }

    /// Validates against an explicit "current year" bound.
    pub fn validate_for_year(&self, v: &mut Validator, current_year: i32) {
        v.check(!self.title.is_empty(), "title", "must be provided");
        v.check(
            self.title.len() <= TITLE_MAX_BYTES,
            "title",
            "must not be more than 500 bytes long",
        );

        v.check(self.year != 0, "year", "must be provided");
        v.check(
            self.year >= EARLIEST_YEAR,
            "year",
            "must be greater than 1888",
        );
        v.check(self.year <= current_year, "year", "must not be in the future");

        v.check(!self.runtime.is_zero(), "runtime", "must be provided");
        v.check(
            self.runtime.minutes() > 0,
            "runtime",
            "must be a positive integer",
        );

        v.check(
            !self.genres.is_empty(),
            "genres",
            "must contain at least 1 genre",
        );
        v.check(
            self.genres.len() <= MAX_GENRES,
            "genres",
            "must not contain more than 5 genres",
        );
        v.check(
            unique(&self.genres),
            "genres",
            "must not contain duplicate values",
        );
    }
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

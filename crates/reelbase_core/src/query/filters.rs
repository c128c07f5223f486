//! Pagination and sort filters for list queries.
//!
//! # Responsibility
//! - Hold the page/size/sort bundle supplied by callers.
//! - Derive `LIMIT`/`OFFSET` and the pagination [`Metadata`] for a result.
//! - Resolve a sort key against its allow-list into a [`SortClause`].
//!
//! # Invariants
//! - A sort key outside the allow-list never becomes SQL; it is reported as
//!   [`FilterError::UnsafeSort`] instead of falling back to a default.
//! - Zero total records always yields `Metadata::default()`.

use crate::model::validation::{permitted_value, Validator};
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_SORT: &str = "id";
pub const MAX_PAGE: u32 = 10_000_000;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Caller contract violations detected before a list query is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("unsafe sort parameter `{sort}`")]
    UnsafeSort { sort: String },
    #[error("sort column `{column}` is not a column of `{table}`")]
    UnknownSortColumn {
        table: &'static str,
        column: &'static str,
    },
    #[error("table `{table}` has no full-text index")]
    NoFullTextIndex { table: &'static str },
    #[error("page {page} is outside 1..=10000000")]
    PageOutOfRange { page: u32 },
    #[error("page size {page_size} is outside 1..=100")]
    PageSizeOutOfRange { page_size: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: u32,
    pub page_size: u32,
    /// Column name, optionally prefixed with `-` for descending order.
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// A sort column proven to come from an allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortClause {
    column: &'static str,
    direction: SortDirection,
}

impl SortClause {
    pub fn column(&self) -> &'static str {
        self.column
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

impl Filters {
    /// Default filters (page 1, 20 per page, sorted by `id`).
    pub fn new(sort_safelist: &'static [&'static str]) -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: DEFAULT_SORT.to_string(),
            sort_safelist,
        }
    }

    pub fn with_page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    /// Reports user-facing filter problems as field messages.
    pub fn validate(&self, v: &mut Validator) {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(self.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(
            self.page_size <= MAX_PAGE_SIZE,
            "page_size",
            "must be a maximum of 100",
        );
        v.check(
            permitted_value(self.sort.as_str(), self.sort_safelist),
            "sort",
            "invalid sort value",
        );
    }

    /// Rejects out-of-range paging that callers were expected to validate.
    pub fn check_bounds(&self) -> Result<(), FilterError> {
        if !(1..=MAX_PAGE).contains(&self.page) {
            return Err(FilterError::PageOutOfRange { page: self.page });
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(FilterError::PageSizeOutOfRange {
                page_size: self.page_size,
            });
        }
        Ok(())
    }

    pub fn sort_clause(&self) -> Result<SortClause, FilterError> {
        let safe: &'static str = self
            .sort_safelist
            .iter()
            .copied()
            .find(|candidate| *candidate == self.sort)
            .ok_or_else(|| FilterError::UnsafeSort {
                sort: self.sort.clone(),
            })?;

        Ok(match safe.strip_prefix('-') {
            Some(column) => SortClause {
                column,
                direction: SortDirection::Descending,
            },
            None => SortClause {
                column: safe,
                direction: SortDirection::Ascending,
            },
        })
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// Pagination metadata returned alongside a list page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub current_page: u32,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub page_size: u32,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub first_page: u32,
    #[serde(skip_serializing_if = "is_zero_u64")]
    pub last_page: u64,
    #[serde(skip_serializing_if = "is_zero_u64")]
    pub total_records: u64,
}

impl Metadata {
    pub fn calculate(total_records: u64, page: u32, page_size: u32) -> Self {
        if total_records == 0 || page_size == 0 {
            return Self::default();
        }

        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: total_records.div_ceil(u64::from(page_size)),
            total_records,
        }
    }
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

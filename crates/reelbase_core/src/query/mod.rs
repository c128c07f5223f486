//! SQL composition for resource tables.
//!
//! # Responsibility
//! - Describe each table's columns and allow-lists ([`table`]).
//! - Turn filters and predicates into parameterized statements ([`builder`]).
//!
//! # Invariants
//! - Interpolated identifiers come only from static [`table::TableSpec`]
//!   metadata or an allow-listed sort key; values are always bound.

pub mod builder;
pub mod filters;
pub mod fts;
pub mod table;

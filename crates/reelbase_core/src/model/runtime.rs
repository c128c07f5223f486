//! Movie runtime in whole minutes.
//!
//! Serialized as the string `"<n> mins"`; stored as a plain integer column.

use rusqlite::types::{FromSql, FromSqlResult, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid runtime format")]
pub struct InvalidRuntimeFormat;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Runtime(pub i32);

impl Runtime {
    pub fn minutes(self) -> i32 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Display for Runtime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} mins", self.0)
    }
}

impl FromStr for Runtime {
    type Err = InvalidRuntimeFormat;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.split(' ');
        let (Some(amount), Some("mins"), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(InvalidRuntimeFormat);
        };
        amount
            .parse::<i32>()
            .map(Runtime)
            .map_err(|_| InvalidRuntimeFormat)
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl FromSql for Runtime {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i32::column_result(value).map(Runtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_unit_suffix() {
        let json = serde_json::to_string(&Runtime(102)).unwrap();
        assert_eq!(json, "\"102 mins\"");
    }

    #[test]
    fn parses_unit_suffixed_string() {
        let runtime: Runtime = serde_json::from_str("\"96 mins\"").unwrap();
        assert_eq!(runtime, Runtime(96));
    }

    #[test]
    fn rejects_other_shapes() {
        for raw in ["\"96\"", "\"96 minutes\"", "\"ninety mins\"", "\"96  mins\"", "96"] {
            assert!(
                serde_json::from_str::<Runtime>(raw).is_err(),
                "{raw} should be rejected"
            );
        }
    }
}

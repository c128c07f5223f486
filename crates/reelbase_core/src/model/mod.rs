//! Versioned record model for every persisted resource.
//!
//! # Responsibility
//! - Define the record shapes (`Movie`, `User`) and their create/patch inputs.
//! - Expose pure validation producing a field -> message mapping.
//!
//! # Invariants
//! - `id`, `created_at` and `version` are assigned by the store, never by callers.
//! - `version` starts at 1 and only moves forward through the update path.

pub mod movie;
pub mod runtime;
pub mod user;
pub mod validation;

/// Store-assigned numeric identifier shared by all resources.
pub type RecordId = i64;

/// Serializes store epoch milliseconds as an RFC 3339 UTC timestamp.
pub(crate) fn serialize_epoch_ms<S>(ms: &i64, ser: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use chrono::{DateTime, SecondsFormat, Utc};

    let at = DateTime::<Utc>::from_timestamp_millis(*ms)
        .ok_or_else(|| serde::ser::Error::custom(format!("timestamp out of range: {ms}")))?;
    ser.serialize_str(&at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

//! Store and logging configuration.
//!
//! # Responsibility
//! - Describe connection pool sizing, idle eviction and call deadlines.
//! - Load settings from TOML text or `REELBASE_*` environment variables.
//!
//! # Invariants
//! - A validated config never has a zero-sized pool or zero timeouts.
//! - `max_idle_conns` never exceeds `max_open_conns`.
//!
//! Durations use the `<n><unit>` form with `ms`, `s`, `m` or `h` units
//! (for example `"15m"` or `"3s"`).

use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DSN: &str = "reelbase.sqlite3";
pub const DEFAULT_MAX_OPEN_CONNS: u32 = 25;
pub const DEFAULT_MAX_IDLE_CONNS: u32 = 25;
pub const DEFAULT_MAX_IDLE_TIME: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// DSN value selecting a pooled in-memory database.
pub const MEMORY_DSN: &str = ":memory:";

const ENV_DSN: &str = "REELBASE_DB_DSN";
const ENV_MAX_OPEN_CONNS: &str = "REELBASE_DB_MAX_OPEN_CONNS";
const ENV_MAX_IDLE_CONNS: &str = "REELBASE_DB_MAX_IDLE_CONNS";
const ENV_MAX_IDLE_TIME: &str = "REELBASE_DB_MAX_IDLE_TIME";
const ENV_QUERY_TIMEOUT: &str = "REELBASE_DB_QUERY_TIMEOUT";
const ENV_BUSY_TIMEOUT: &str = "REELBASE_DB_BUSY_TIMEOUT";
const ENV_LOG_LEVEL: &str = "REELBASE_LOG_LEVEL";
const ENV_LOG_DIR: &str = "REELBASE_LOG_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid duration `{value}`; expected <n>ms|s|m|h")]
    InvalidDuration { value: String },
    #[error("invalid value `{value}` for `{key}`")]
    InvalidNumber { key: &'static str, value: String },
    #[error("database dsn cannot be empty")]
    EmptyDsn,
    #[error("max_open_conns must be greater than zero")]
    ZeroPoolSize,
    #[error("max_idle_conns ({idle}) must not exceed max_open_conns ({open})")]
    IdleExceedsOpen { idle: u32, open: u32 },
    #[error("`{0}` must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Connection pool and deadline settings for the relational store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbConfig {
    /// SQLite file path, or `:memory:` for a pooled in-memory database.
    pub dsn: String,
    /// Upper bound on open connections (in use + idle).
    pub max_open_conns: u32,
    /// Connections kept warm; anything above this is evicted after `max_idle_time`.
    pub max_idle_conns: u32,
    #[serde(deserialize_with = "deserialize_duration")]
    pub max_idle_time: Duration,
    /// Default deadline applied to every repository call.
    #[serde(deserialize_with = "deserialize_duration")]
    pub query_timeout: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub busy_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            dsn: DEFAULT_DSN.to_string(),
            max_open_conns: DEFAULT_MAX_OPEN_CONNS,
            max_idle_conns: DEFAULT_MAX_IDLE_CONNS,
            max_idle_time: DEFAULT_MAX_IDLE_TIME,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl DbConfig {
    /// Config for a pooled in-memory database, mostly useful in tests.
    pub fn in_memory() -> Self {
        Self {
            dsn: MEMORY_DSN.to_string(),
            max_open_conns: 4,
            max_idle_conns: 4,
            ..Self::default()
        }
    }

    /// Parses a `[db]`-less TOML document and validates it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from defaults overridden by `REELBASE_DB_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(dsn) = lookup(ENV_DSN) {
            config.dsn = dsn;
        }
        if let Some(value) = lookup(ENV_MAX_OPEN_CONNS) {
            config.max_open_conns = parse_u32(ENV_MAX_OPEN_CONNS, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_IDLE_CONNS) {
            config.max_idle_conns = parse_u32(ENV_MAX_IDLE_CONNS, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_IDLE_TIME) {
            config.max_idle_time = parse_duration(&value)?;
        }
        if let Some(value) = lookup(ENV_QUERY_TIMEOUT) {
            config.query_timeout = parse_duration(&value)?;
        }
        if let Some(value) = lookup(ENV_BUSY_TIMEOUT) {
            config.busy_timeout = parse_duration(&value)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dsn.trim().is_empty() {
            return Err(ConfigError::EmptyDsn);
        }
        if self.max_open_conns == 0 {
            return Err(ConfigError::ZeroPoolSize);
        }
        if self.max_idle_conns > self.max_open_conns {
            return Err(ConfigError::IdleExceedsOpen {
                idle: self.max_idle_conns,
                open: self.max_open_conns,
            });
        }
        if self.query_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("query_timeout"));
        }
        if self.busy_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("busy_timeout"));
        }
        Ok(())
    }

    /// Busy timeout for pooled connections, never longer than `query_timeout`.
    ///
    /// SQLite's busy wait ignores the statement deadline, so a longer wait
    /// would let a contended write outlive its call.
    pub fn effective_busy_timeout(&self) -> Duration {
        self.busy_timeout.min(self.query_timeout)
    }

    pub fn is_memory(&self) -> bool {
        self.dsn.trim() == MEMORY_DSN
    }
}

/// File logging settings; logging stays off when `dir` is unset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogConfig {
    pub level: Option<String>,
    pub dir: Option<String>,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self {
            level: std::env::var(ENV_LOG_LEVEL).ok(),
            dir: std::env::var(ENV_LOG_DIR).ok(),
        }
    }
}

/// Parses `<n>ms`, `<n>s`, `<n>m` or `<n>h`.
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    let trimmed = value.trim();
    let invalid = || ConfigError::InvalidDuration {
        value: value.to_string(),
    };

    let split_at = trimmed
        .find(|ch: char| !ch.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (digits, unit) = trimmed.split_at(split_at);
    let amount: u64 = digits.parse().map_err(|_| invalid())?;

    let duration = match unit {
        "ms" => Duration::from_millis(amount),
        "s" => Duration::from_secs(amount),
        "m" => Duration::from_secs(amount.checked_mul(60).ok_or_else(invalid)?),
        "h" => Duration::from_secs(amount.checked_mul(3_600).ok_or_else(invalid)?),
        _ => return Err(invalid()),
    };
    Ok(duration)
}

fn parse_u32(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        })
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}

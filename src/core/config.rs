/*!
 * Access Configuration
 * Runtime knobs for the cache and upstream fetches, overridable from the environment
 */

use super::errors::ConfigError;
use super::limits::{
    DEFAULT_CLEANUP_INTERVAL, DEFAULT_MAX_ROUTE_ENTRIES, DEFAULT_MAX_USER_ENTRIES,
    DEFAULT_ROLE_FETCH_TIMEOUT, DEFAULT_ROUTE_ACCESS_TTL, DEFAULT_USER_DATA_TTL,
    MAX_ROUTE_ACCESS_TTL, MAX_USER_DATA_TTL,
};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds, DurationSeconds};
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// Runtime configuration for the access layer
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AccessConfig {
    /// Lifetime of a cached user role/permission entry
    #[serde_as(as = "DurationSeconds<u64>")]
    pub user_ttl: Duration,
    /// Lifetime of a cached route decision
    #[serde_as(as = "DurationSeconds<u64>")]
    pub route_ttl: Duration,
    pub max_user_entries: usize,
    pub max_route_entries: usize,
    /// Interval of the background expiry sweep
    #[serde_as(as = "DurationSeconds<u64>")]
    pub cleanup_interval: Duration,
    /// Upper bound on a single role fetch from the persistence layer
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub fetch_timeout: Duration,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            user_ttl: DEFAULT_USER_DATA_TTL,
            route_ttl: DEFAULT_ROUTE_ACCESS_TTL,
            max_user_entries: DEFAULT_MAX_USER_ENTRIES,
            max_route_entries: DEFAULT_MAX_ROUTE_ENTRIES,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            fetch_timeout: DEFAULT_ROLE_FETCH_TIMEOUT,
        }
    }
}

impl AccessConfig {
    /// Load from process environment
    ///
    /// Environment variables:
    /// - PITCH_GUARD_USER_TTL_SECS
    /// - PITCH_GUARD_ROUTE_TTL_SECS
    /// - PITCH_GUARD_MAX_USERS
    /// - PITCH_GUARD_MAX_ROUTES
    /// - PITCH_GUARD_CLEANUP_SECS
    /// - PITCH_GUARD_FETCH_TIMEOUT_MS
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup, falling back to defaults for missing keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secs) = parse_key::<u64, _>(&lookup, "PITCH_GUARD_USER_TTL_SECS")? {
            config.user_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_key::<u64, _>(&lookup, "PITCH_GUARD_ROUTE_TTL_SECS")? {
            config.route_ttl = Duration::from_secs(secs);
        }
        if let Some(max) = parse_key(&lookup, "PITCH_GUARD_MAX_USERS")? {
            config.max_user_entries = max;
        }
        if let Some(max) = parse_key(&lookup, "PITCH_GUARD_MAX_ROUTES")? {
            config.max_route_entries = max;
        }
        if let Some(secs) = parse_key::<u64, _>(&lookup, "PITCH_GUARD_CLEANUP_SECS")? {
            config.cleanup_interval = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_key::<u64, _>(&lookup, "PITCH_GUARD_FETCH_TIMEOUT_MS")? {
            config.fetch_timeout = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the cache cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        let nonzero = [
            ("user_ttl", self.user_ttl.is_zero()),
            ("route_ttl", self.route_ttl.is_zero()),
            ("cleanup_interval", self.cleanup_interval.is_zero()),
            ("fetch_timeout", self.fetch_timeout.is_zero()),
            ("max_user_entries", self.max_user_entries == 0),
            ("max_route_entries", self.max_route_entries == 0),
        ];
        if let Some((key, _)) = nonzero.iter().find(|(_, zero)| *zero) {
            return Err(ConfigError::InvalidValue {
                key: (*key).to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let ceilings = [
            ("user_ttl", self.user_ttl, MAX_USER_DATA_TTL),
            ("route_ttl", self.route_ttl, MAX_ROUTE_ACCESS_TTL),
        ];
        if let Some((key, ttl, max)) = ceilings.iter().find(|(_, ttl, max)| ttl > max) {
            return Err(ConfigError::InvalidValue {
                key: (*key).to_string(),
                reason: format!("{ttl:?} exceeds the maximum of {max:?}"),
            });
        }

        if self.route_ttl > self.user_ttl {
            return Err(ConfigError::InvalidValue {
                key: "route_ttl".to_string(),
                reason: format!(
                    "route decisions ({:?}) cannot outlive user data ({:?})",
                    self.route_ttl, self.user_ttl
                ),
            });
        }

        Ok(())
    }
}

fn parse_key<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                reason: e.to_string(),
            }),
    }
}

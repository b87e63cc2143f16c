//! Configuration for a database target.
//!
//! The shape mirrors the JSON document the CLI reads:
//!
//! ```json
//! {
//!   "connection": { "url": "sqlite:app.db" },
//!   "pool": { "max": 10, "min": 2, "idleTimeoutMillis": 30000 },
//!   "debug": false
//! }
//! ```
//!
//! `pool` may also be `false`, which routes every statement to one
//! long-lived connection, or `true` for the default pool settings.

use std::path::Path;
use std::time::Duration;

use keel_schema::Dialect;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Settings for one database target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Endpoint settings. When absent, initialization is skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionSettings>,
    /// Pooling policy.
    #[serde(default)]
    pub pool: PoolSetting,
    /// Log every dispatched statement.
    #[serde(default)]
    pub debug: bool,
}

impl ClientConfig {
    /// Creates a pooled configuration for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            connection: Some(ConnectionSettings::new(url)),
            ..Self::default()
        }
    }

    /// Reads a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces the connection URL, keeping any explicit dialect.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        let dialect = self.connection.as_ref().and_then(|c| c.dialect);
        self.connection = Some(ConnectionSettings {
            url: url.into(),
            dialect,
        });
        self
    }

    /// Sets the pooling policy.
    #[must_use]
    pub fn with_pool(mut self, pool: PoolSetting) -> Self {
        self.pool = pool;
        self
    }

    /// Checks pool bounds.
    pub fn validate(&self) -> Result<()> {
        if let PoolSetting::Enabled(pool) = &self.pool {
            if pool.max == 0 {
                return Err(ClientError::Configuration(
                    "pool.max must be at least 1".to_string(),
                ));
            }
            if pool.min > pool.max {
                return Err(ClientError::Configuration(format!(
                    "pool.min ({}) exceeds pool.max ({})",
                    pool.min, pool.max
                )));
            }
        }
        Ok(())
    }
}

/// Driver-specific endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Connection URL, e.g. `postgres://user@localhost/app`.
    pub url: String,
    /// Explicit dialect; inferred from the URL scheme when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
}

impl ConnectionSettings {
    /// Creates settings for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            dialect: None,
        }
    }

    /// Returns the dialect of this endpoint.
    pub fn dialect(&self) -> Result<Dialect> {
        self.dialect
            .or_else(|| Dialect::from_url(&self.url))
            .ok_or_else(|| {
                ClientError::Configuration(format!(
                    "cannot infer a dialect from connection url '{}'",
                    self.url
                ))
            })
    }

    /// Returns the database name from the URL path, if any.
    #[must_use]
    pub fn database_name(&self) -> Option<&str> {
        let rest = self.url.split_once("://")?.1;
        let path = rest.split_once('/')?.1;
        let name = path.split(['?', '#']).next()?;
        (!name.is_empty()).then_some(name)
    }
}

/// Pool bounds and idle policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfig {
    /// Maximum open connections.
    #[serde(default = "default_max")]
    pub max: u32,
    /// Connections kept open while idle.
    #[serde(default = "default_min")]
    pub min: u32,
    /// Idle time after which a connection is closed.
    #[serde(default = "default_idle_timeout_millis")]
    pub idle_timeout_millis: u64,
    /// Upper bound on waiting for a free connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquire_timeout_millis: Option<u64>,
}

const fn default_max() -> u32 {
    10
}

const fn default_min() -> u32 {
    2
}

const fn default_idle_timeout_millis() -> u64 {
    30_000
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max: default_max(),
            min: default_min(),
            idle_timeout_millis: default_idle_timeout_millis(),
            acquire_timeout_millis: None,
        }
    }
}

impl PoolConfig {
    /// Idle timeout as a duration.
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_millis)
    }

    /// Acquire timeout as a duration.
    #[must_use]
    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout_millis.map(Duration::from_millis)
    }
}

/// Pooling policy: a bounded pool, or one long-lived connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPoolSetting", into = "RawPoolSetting")]
pub enum PoolSetting {
    /// Every statement runs on a single connection.
    Disabled,
    /// Statements borrow connections from a pool.
    Enabled(PoolConfig),
}

impl Default for PoolSetting {
    fn default() -> Self {
        Self::Enabled(PoolConfig::default())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawPoolSetting {
    Flag(bool),
    Config(PoolConfig),
}

impl From<RawPoolSetting> for PoolSetting {
    fn from(raw: RawPoolSetting) -> Self {
        match raw {
            RawPoolSetting::Flag(false) => Self::Disabled,
            RawPoolSetting::Flag(true) => Self::default(),
            RawPoolSetting::Config(config) => Self::Enabled(config),
        }
    }
}

impl From<PoolSetting> for RawPoolSetting {
    fn from(setting: PoolSetting) -> Self {
        match setting {
            PoolSetting::Disabled => Self::Flag(false),
            PoolSetting::Enabled(config) => Self::Config(config),
        }
    }
}

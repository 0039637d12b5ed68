//! Server configuration.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `WASTETRACK_*` environment variables. The log filter additionally honours
//! `RUST_LOG` when the subscriber is installed.

use crate::daily::{ScheduleSettings, SchedulerError};
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "WASTETRACK_CONFIG";

const ENV_PREFIX: &str = "WASTETRACK_";
const SECONDS_PER_MINUTE: i32 = 60;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for [`Config`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// An environment override could not be parsed.
    #[error("invalid value '{value}' for {key}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Rejected value.
        value: String,
    },
    /// The business-timezone offset is out of range.
    #[error("utc offset of {0} minutes is out of range")]
    InvalidOffset(i32),
    /// The schedule timings are invalid.
    #[error(transparent)]
    Schedule(#[from] SchedulerError),
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// `PostgreSQL` settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL; required by the server binary.
    #[serde(default)]
    pub url: Option<String>,
    /// Maximum pooled connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: default_pool_size(),
        }
    }
}

/// Daily generation timing and business timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Business timezone as minutes east of UTC.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Seconds to wait before the first run.
    #[serde(default = "default_startup_delay_secs")]
    pub startup_delay_secs: u64,
    /// Seconds between runs.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            startup_delay_secs: default_startup_delay_secs(),
            interval_secs: default_interval_secs(),
        }
    }
}

/// API access settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Bearer token for admin endpoints; admin calls are refused when unset.
    #[serde(default)]
    pub admin_token: Option<String>,
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directives used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Daily generation schedule.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// API access.
    #[serde(default)]
    pub api: ApiConfig,
    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_owned()
}

const fn default_pool_size() -> u32 {
    8
}

const fn default_startup_delay_secs() -> u64 {
    5
}

const fn default_interval_secs() -> u64 {
    60 * 60
}

fn default_log_filter() -> String {
    "info".to_owned()
}

impl Config {
    /// Parses configuration from TOML text; missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is not valid.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let read_error = |source| ConfigError::Read {
            path: path.to_string(),
            source,
        };
        let parent = path
            .parent()
            .filter(|dir| !dir.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            read_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path has no file name",
            ))
        })?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let text = dir.read_to_string(file_name).map_err(read_error)?;
        Self::from_toml_str(&text)
    }

    /// Loads the file named by [`CONFIG_PATH_ENV`], if set, and applies
    /// environment overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::from_file`] or [`Self::apply_env`].
    pub fn load() -> Result<Self, ConfigError> {
        let base = std::env::var(CONFIG_PATH_ENV)
            .ok()
            .map(|path| Self::from_file(Utf8Path::new(&path)))
            .transpose()?
            .unwrap_or_default();
        base.apply_env(std::env::vars())
    }

    /// Applies `WASTETRACK_*` overrides from `vars`; other keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a numeric or boolean
    /// override cannot be parsed.
    pub fn apply_env<I>(mut self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "BIND_ADDR" => self.server.bind_addr = value,
                "DATABASE_URL" => self.database.url = Some(value),
                "DATABASE_POOL_SIZE" => self.database.pool_size = parse_value(&key, &value)?,
                "UTC_OFFSET_MINUTES" => {
                    self.schedule.utc_offset_minutes = parse_value(&key, &value)?;
                }
                "STARTUP_DELAY_SECS" => {
                    self.schedule.startup_delay_secs = parse_value(&key, &value)?;
                }
                "INTERVAL_SECS" => self.schedule.interval_secs = parse_value(&key, &value)?,
                "ADMIN_TOKEN" => self.api.admin_token = Some(value),
                "LOG_FILTER" => self.logging.filter = value,
                "LOG_JSON" => self.logging.json = parse_value(&key, &value)?,
                _ => {}
            }
        }
        Ok(self)
    }

    /// Returns the business timezone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOffset`] when the offset is not within
    /// ±24 hours.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        let minutes = self.schedule.utc_offset_minutes;
        minutes
            .checked_mul(SECONDS_PER_MINUTE)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidOffset(minutes))
    }

    /// Returns the scheduler timings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Schedule`] when the interval is zero.
    pub fn schedule_settings(&self) -> Result<ScheduleSettings, ConfigError> {
        Ok(ScheduleSettings::new(
            Duration::from_secs(self.schedule.startup_delay_secs),
            Duration::from_secs(self.schedule.interval_secs),
        )?)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}

//! Application configuration
//!
//! Layered in order, later layers winning:
//! 1. Built-in defaults
//! 2. TOML file (`--config` or `CPTY_CONFIG`)
//! 3. Environment (`CPTY_BASE_URL`, `CPTY_REFRESH_SECS`, `CPTY_UPDATE_METHOD`, `CPTY_LOG`, `CPTY_LOG_JSON`)
//! 4. Command-line flags

use cpty_client::{ClientConfig, UpdateMethod};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "CPTY_CONFIG";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// Environment variable has an unusable value
    #[error("invalid value for {name}: '{value}'")]
    InvalidEnv {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },

    /// Base URL does not parse
    #[error("invalid base url '{url}': {reason}")]
    InvalidUrl {
        /// Configured URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// Refresh interval is zero
    #[error("refresh interval must be at least one second")]
    ZeroInterval,
}

/// Logging options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend location
    pub client: ClientConfig,
    /// Seconds between background refreshes
    pub refresh_interval_secs: u64,
    /// Logging
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            refresh_interval_secs: 10,
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a TOML file; missing keys keep their defaults
    ///
    /// # Errors
    /// `ConfigError::Io` or `ConfigError::Parse`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then file, then process environment
    ///
    /// Not validated: flags still apply on top, so call `validate` once the
    /// last layer is in.
    ///
    /// # Errors
    /// Any `ConfigError` from the file or environment layers
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Same as `load`, reading variables through `lookup`
    ///
    /// # Errors
    /// Any `ConfigError` from the file or environment layers
    pub fn load_with(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let env_path = lookup(CONFIG_ENV).map(PathBuf::from);
        let mut config = match path.or(env_path.as_deref()) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`
    ///
    /// # Errors
    /// `ConfigError::InvalidEnv` for unparsable numbers, booleans or methods
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("CPTY_BASE_URL") {
            self.client.base_url = url;
        }
        if let Some(raw) = lookup("CPTY_REFRESH_SECS") {
            self.refresh_interval_secs = raw.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "CPTY_REFRESH_SECS",
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup("CPTY_UPDATE_METHOD") {
            self.client.update_method = match raw.to_ascii_lowercase().as_str() {
                "put" => UpdateMethod::Put,
                "patch" => UpdateMethod::Patch,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        name: "CPTY_UPDATE_METHOD",
                        value: raw,
                    })
                }
            };
        }
        if let Some(filter) = lookup("CPTY_LOG") {
            self.log.filter = filter;
        }
        if let Some(raw) = lookup("CPTY_LOG_JSON") {
            self.log.json = parse_bool(&raw).ok_or(ConfigError::InvalidEnv {
                name: "CPTY_LOG_JSON",
                value: raw.clone(),
            })?;
        }
        Ok(())
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.client.base_url = url.into();
        self
    }

    /// With refresh interval in seconds
    #[inline]
    #[must_use]
    pub fn with_refresh_secs(mut self, secs: u64) -> Self {
        self.refresh_interval_secs = secs;
        self
    }

    /// Check the base URL and interval
    ///
    /// # Errors
    /// `ConfigError::InvalidUrl` or `ConfigError::ZeroInterval`
    pub fn validate(&self) -> Result<(), ConfigError> {
        reqwest::Url::parse(&self.client.base_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.client.base_url.clone(),
            reason: e.to_string(),
        })?;
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    /// Refresh interval as a duration
    #[inline]
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

//! Gateway configuration from environment variables

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use tracing::Level;

pub const ENV_PORT: &str = "DPP_LEDGER_PORT";
pub const ENV_LOG_LEVEL: &str = "DPP_LEDGER_LOG_LEVEL";
pub const ENV_NAME: &str = "DPP_LEDGER_NAME";
pub const ENV_SEED_FILE: &str = "DPP_LEDGER_SEED_FILE";
pub const ENV_ALLOW_UNSIGNED: &str = "DPP_LEDGER_ALLOW_UNSIGNED";

/// Invalid configuration value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a valid port number, got '{value}'")]
    InvalidPort { name: &'static str, value: String },

    #[error("{name} must be one of trace, debug, info, warn, error; got '{value}'")]
    InvalidLogLevel { name: &'static str, value: String },

    #[error("{name} must be true or false, got '{value}'")]
    InvalidFlag { name: &'static str, value: String },
}

/// Ledger gateway configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// TCP port to listen on
    pub port: u16,
    /// Maximum tracing level
    pub log_level: Level,
    /// Human-readable name reported by `/ready`
    pub ledger_name: Option<String>,
    /// JSON array of records written at startup
    pub seed_file: Option<PathBuf>,
    /// Accept unsigned create, update, transfer and delete
    pub allow_unsigned: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            log_level: Level::INFO,
            ledger_name: None,
            seed_file: None,
            allow_unsigned: false,
        }
    }
}

impl LedgerConfig {
    /// Read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable lookup; unset or empty variables take defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get(ENV_PORT) {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort {
                name: ENV_PORT,
                value,
            })?,
            None => defaults.port,
        };

        let log_level = match get(ENV_LOG_LEVEL) {
            Some(value) => value.trim().parse::<Level>().map_err(|_| ConfigError::InvalidLogLevel {
                name: ENV_LOG_LEVEL,
                value,
            })?,
            None => defaults.log_level,
        };

        let allow_unsigned = match get(ENV_ALLOW_UNSIGNED) {
            Some(value) => parse_flag(ENV_ALLOW_UNSIGNED, value)?,
            None => defaults.allow_unsigned,
        };

        Ok(Self {
            port,
            log_level,
            ledger_name: get(ENV_NAME),
            seed_file: get(ENV_SEED_FILE).map(PathBuf::from),
            allow_unsigned,
        })
    }

    /// Socket address to bind
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_flag(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name, value }),
    }
}

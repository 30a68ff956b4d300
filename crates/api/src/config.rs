//! Runtime configuration, read from the process environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use myrestful_observability::LoggingConfig;

pub const BIND_ADDR_VAR: &str = "MYRESTFUL_BIND_ADDR";
pub const DATABASE_VAR: &str = "MYRESTFUL_DATABASE";
pub const LOG_DIR_VAR: &str = "MYRESTFUL_LOG_DIR";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DATABASE: &str = "MyDatabase";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidBindAddr { var: &'static str, value: String },

    #[error("{var} must not be blank")]
    Blank { var: &'static str },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// Name of the in-memory store shared by every request.
    pub database_name: String,
    pub logging: LoggingConfig,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = match lookup(BIND_ADDR_VAR) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddr {
                    var: BIND_ADDR_VAR,
                    value,
                })?,
            None => default_bind_addr(),
        };

        let database_name = match lookup(DATABASE_VAR) {
            Some(value) if value.trim().is_empty() => {
                return Err(ConfigError::Blank { var: DATABASE_VAR });
            }
            Some(value) => value.trim().to_string(),
            None => DEFAULT_DATABASE.to_string(),
        };

        let mut logging = LoggingConfig::default();
        if let Some(dir) = lookup(LOG_DIR_VAR) {
            if dir.trim().is_empty() {
                return Err(ConfigError::Blank { var: LOG_DIR_VAR });
            }
            logging.directory = PathBuf::from(dir.trim());
        }

        Ok(Self {
            bind_addr,
            database_name,
            logging,
        })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            database_name: DEFAULT_DATABASE.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

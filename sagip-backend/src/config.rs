use std::{env, num::ParseIntError};

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Path to the SQLite file, or `:memory:`.
    pub database: String,
    /// Allowed CORS origin. Any origin when unset.
    pub cors_origin: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid SAGIP_PORT `{value}`: {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 4000,
            database: "sagip.db".to_string(),
            cors_origin: None,
        }
    }
}

impl Config {
    /// Reads `SAGIP_PORT`, `SAGIP_DATABASE` and `SAGIP_CORS_ORIGIN`, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("SAGIP_PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => {
                log::info!("SAGIP_PORT not set, using default: {}", defaults.port);
                defaults.port
            }
        };

        let database = lookup("SAGIP_DATABASE")
            .filter(|path| !path.trim().is_empty())
            .unwrap_or(defaults.database);

        let cors_origin = lookup("SAGIP_CORS_ORIGIN").filter(|origin| !origin.trim().is_empty());

        Ok(Self {
            port,
            database,
            cors_origin,
        })
    }
}

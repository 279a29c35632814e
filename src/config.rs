//! Server configuration from environment variables (and an optional `.env`).

use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{name} has an invalid value {value:?}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Player directory seed file (`id,user_id,first_name,last_name,level`).
    pub players_csv: Option<PathBuf>,
    /// Fixed seed for group/bracket shuffles.
    pub shuffle_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            players_csv: None,
            shuffle_seed: None,
        }
    }
}

impl Config {
    /// Read `HOST`, `PORT`, `PLAYERS_CSV` and `SHUFFLE_SEED`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env` with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError {
                name: "PORT",
                value: raw,
            })?,
            None => defaults.port,
        };
        let shuffle_seed = match var("SHUFFLE_SEED") {
            Some(raw) => Some(raw.parse().map_err(|_| ConfigError {
                name: "SHUFFLE_SEED",
                value: raw,
            })?),
            None => None,
        };

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port,
            players_csv: var("PLAYERS_CSV").map(PathBuf::from),
            shuffle_seed,
        })
    }

    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

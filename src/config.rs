use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MONGODB_URI: &str = "mongodb://127.0.0.1:27017";
pub const DEFAULT_DATABASE: &str = "roommate_finder";
pub const APP_NAME: &str = "RoommateFinder";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::Invalid {
                key: "STORE_BACKEND",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Service configuration sourced from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub backend: StoreBackend,
    pub mongodb_uri: String,
    pub database: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host: IpAddr = host.parse().map_err(|_| ConfigError::Invalid {
            key: "HOST",
            value: host.clone(),
        })?;
        let port = match var("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: port })?,
            None => DEFAULT_PORT,
        };
        let backend = match var("STORE_BACKEND") {
            Some(backend) => backend.parse()?,
            None => StoreBackend::Mongo,
        };

        Ok(Config {
            bind_addr: SocketAddr::new(host, port),
            backend,
            mongodb_uri: mongodb_uri(&var),
            database: var("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        })
    }
}

/// `MONGODB_URI` wins; otherwise an Atlas SRV string is assembled from
/// `DB_USER`, `DB_PASS` and `DB_CLUSTER` when all three are set.
fn mongodb_uri(var: &impl Fn(&str) -> Option<String>) -> String {
    if let Some(uri) = var("MONGODB_URI") {
        return uri;
    }
    match (var("DB_USER"), var("DB_PASS"), var("DB_CLUSTER")) {
        (Some(user), Some(pass), Some(cluster)) => format!(
            "mongodb+srv://{user}:{pass}@{cluster}/?retryWrites=true&w=majority&appName={APP_NAME}"
        ),
        _ => DEFAULT_MONGODB_URI.to_string(),
    }
}

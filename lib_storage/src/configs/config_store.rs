//! # Store Configuration
//!
//! Resolves connection settings for the document store (MongoDB) and the
//! cache store (Redis) from environment variables, with fixed fallback
//! defaults. Resolution happens once at startup; the resulting structs are
//! passed by reference to whatever code needs store access.

use std::env;
use std::num::ParseIntError;

use thiserror::Error;

/// Environment variable holding the document-store host.
pub const DB_HOST_VAR: &str = "DB_HOST";
/// Environment variable holding the document-store port.
pub const DB_PORT_VAR: &str = "DB_PORT";
/// Environment variable holding the document-store database name.
pub const DB_DATABASE_VAR: &str = "DB_DATABASE";

const DEFAULT_DB_HOST: &str = "127.0.0.1";
const DEFAULT_DB_PORT: u16 = 27017;
const DEFAULT_DB_DATABASE: &str = "files_manager";

/// Default connection target for the cache store. No environment override
/// is exposed for it.
pub const DEFAULT_CACHE_URL: &str = "redis://127.0.0.1/";

/// Custom error types for configuration resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable {0} is not valid UTF-8")]
    NotUnicode(String),
    #[error("Invalid value '{value}' for {DB_PORT_VAR}: {source}")]
    InvalidPort {
        value: String,
        source: ParseIntError,
    },
}

/// Connection settings for the document store.
///
/// NOTE: the legacy deployment read the host from `DB_PORT` and the port
/// from `DB_HOST`. That wiring was a defect; here each variable feeds the
/// field its name says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Host name or address of the MongoDB server.
    pub host: String,
    /// Port the MongoDB server listens on.
    pub port: u16,
    /// Name of the database holding the `users` and `files` collections.
    pub database: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            database: DEFAULT_DB_DATABASE.to_string(),
        }
    }
}

impl DbConfig {
    /// Resolves the configuration from the process environment.
    ///
    /// Unset variables fall back to their defaults; a `DB_PORT` value that
    /// does not parse as a port number is an error rather than a silent
    /// fallback.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| match env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(name.to_string())),
        })
    }

    /// Resolves the configuration through an arbitrary variable lookup.
    fn from_lookup<F>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Result<Option<String>, ConfigError>,
    {
        let host = lookup(DB_HOST_VAR)?.unwrap_or_else(|| DEFAULT_DB_HOST.to_string());
        let port = match lookup(DB_PORT_VAR)? {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|source| ConfigError::InvalidPort { value: raw, source })?,
            None => DEFAULT_DB_PORT,
        };
        let database = lookup(DB_DATABASE_VAR)?.unwrap_or_else(|| DEFAULT_DB_DATABASE.to_string());
        Ok(Self { host, port, database })
    }

    /// Renders the MongoDB connection string for these settings.
    pub fn uri(&self) -> String {
        format!("mongodb://{}:{}/{}", self.host, self.port, self.database)
    }
}

/// Connection settings for the cache store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// The redis URL (e.g., "redis://127.0.0.1/").
    pub url: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { url: DEFAULT_CACHE_URL.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl FnMut(&str) -> Result<Option<String>, ConfigError> + 'a {
        move |name| {
            Ok(pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string()))
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = DbConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, DbConfig::default());
        assert_eq!(config.uri(), "mongodb://127.0.0.1:27017/files_manager");
    }

    #[test]
    fn each_variable_feeds_its_own_field() {
        let config = DbConfig::from_lookup(lookup_from(&[
            (DB_HOST_VAR, "mongo.internal"),
            (DB_PORT_VAR, "27018"),
            (DB_DATABASE_VAR, "files_manager_test"),
        ]))
        .unwrap();
        assert_eq!(config.host, "mongo.internal");
        assert_eq!(config.port, 27018);
        assert_eq!(config.database, "files_manager_test");
        assert_eq!(config.uri(), "mongodb://mongo.internal:27018/files_manager_test");
    }

    #[test]
    fn partial_overrides_keep_remaining_defaults() {
        let config = DbConfig::from_lookup(lookup_from(&[(DB_PORT_VAR, "4242")])).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 4242);
        assert_eq!(config.database, "files_manager");
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = DbConfig::from_lookup(lookup_from(&[(DB_PORT_VAR, "not-a-port")])).unwrap_err();
        match err {
            ConfigError::InvalidPort { value, .. } => assert_eq!(value, "not-a-port"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cache_config_defaults_to_local_redis() {
        assert_eq!(CacheConfig::default().url, DEFAULT_CACHE_URL);
    }
}

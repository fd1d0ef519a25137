use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

/// Pool floor used when `DB_POOL_SIZE` is absent or not an integer.
pub const DEFAULT_POOL_SIZE: u32 = 5;
/// Extra connections used when `DB_MAX_OVERFLOW` is absent or not an integer.
pub const DEFAULT_MAX_OVERFLOW: u32 = 10;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

/// The part of the configuration that comes from `config.toml` and the
/// `VACINA__*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where the HTTP server listens and which browser origins may call it.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. A single `*` allows any origin without credentials.
    pub cors_origins: Vec<String>,
}

impl ServerSettings {
    /// Resolves `host:port` into the address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| ConfigError::ValidationError(format!("invalid server address {}:{}: {e}", self.host, self.port)))?
            .next()
            .ok_or_else(|| ConfigError::ValidationError(format!("server address {}:{} resolved to nothing", self.host, self.port)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSettings {
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

/// Connection settings for the statistics database.
///
/// These use the conventional variable names (`DATABASE_URL`, `DB_POOL_SIZE`,
/// `DB_MAX_OVERFLOW`) rather than the `VACINA__` prefix so that existing
/// deployments keep working.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub url: String,
    pub pool_size: u32,
    pub max_overflow: u32,
}

impl DatabaseSettings {
    /// Builds the settings from a variable lookup (normally `std::env::var`).
    ///
    /// A missing or blank URL is an error. Pool sizes that do not parse fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        Ok(Self {
            url,
            pool_size: parse_or_default(lookup("DB_POOL_SIZE"), DEFAULT_POOL_SIZE),
            max_overflow: parse_or_default(lookup("DB_MAX_OVERFLOW"), DEFAULT_MAX_OVERFLOW),
        })
    }
}

// The URL usually embeds a password.
impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("url", &"<redacted>")
            .field("pool_size", &self.pool_size)
            .field("max_overflow", &self.max_overflow)
            .finish()
    }
}

fn parse_or_default(raw: Option<String>, default: u32) -> u32 {
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::debug!(value = %value, default, "Ignoring non-integer pool setting.");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn missing_database_url_is_fatal() {
        let result = DatabaseSettings::from_lookup(lookup_from(&[("DB_POOL_SIZE", "3")]));
        assert!(matches!(result, Err(ConfigError::MissingDatabaseUrl)));
    }

    #[test]
    fn blank_database_url_is_fatal() {
        let result = DatabaseSettings::from_lookup(lookup_from(&[("DATABASE_URL", "   ")]));
        assert!(matches!(result, Err(ConfigError::MissingDatabaseUrl)));
    }

    #[test]
    fn pool_sizes_default_when_absent() {
        let settings =
            DatabaseSettings::from_lookup(lookup_from(&[("DATABASE_URL", "postgresql://u:p@db/vacina")])).unwrap();
        assert_eq!(settings.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(settings.max_overflow, DEFAULT_MAX_OVERFLOW);
    }

    #[test]
    fn pool_sizes_fall_back_silently_on_garbage() {
        let settings = DatabaseSettings::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://u:p@db/vacina"),
            ("DB_POOL_SIZE", "lots"),
            ("DB_MAX_OVERFLOW", " 4 "),
        ]))
        .unwrap();
        assert_eq!(settings.pool_size, 5);
        assert_eq!(settings.max_overflow, 4);
    }

    #[test]
    fn debug_output_hides_the_url() {
        let settings =
            DatabaseSettings::from_lookup(lookup_from(&[("DATABASE_URL", "postgresql://u:secret@db/vacina")])).unwrap();
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn socket_addr_resolves_ip_literals() {
        let server = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 8001,
            cors_origins: vec![],
        };
        assert_eq!(server.socket_addr().unwrap(), "127.0.0.1:8001".parse().unwrap());
    }
}

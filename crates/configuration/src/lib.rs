use crate::error::ConfigError;
use crate::settings::AppSettings;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{DatabaseSettings, LoggingSettings, ServerSettings, Settings};

/// Name of the optional configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Prefix for environment overrides, e.g. `VACINA__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "VACINA";

/// Origins the dashboard is served from during development.
const DEFAULT_CORS_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:8081",
    "http://127.0.0.1:8081",
];

/// Loads the complete application configuration.
///
/// This function is the primary entry point for this crate. Server and logging
/// settings come from built-in defaults, then `config.toml` (if present), then
/// `VACINA__*` environment variables. Database settings come from
/// `DATABASE_URL`, `DB_POOL_SIZE` and `DB_MAX_OVERFLOW`.
pub fn load_config() -> Result<Settings, ConfigError> {
    let app = load_app_settings(Path::new(CONFIG_FILE), config::Environment::with_prefix(ENV_PREFIX))?;
    let database = DatabaseSettings::from_lookup(|key| std::env::var(key).ok())?;

    Ok(Settings {
        database,
        server: app.server,
        logging: app.logging,
    })
}

/// Layers defaults, the given file and the given environment source.
pub fn load_app_settings(file: &Path, environment: config::Environment) -> Result<AppSettings, ConfigError> {
    let builder = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8001)?
        .set_default("server.cors_origins", DEFAULT_CORS_ORIGINS.to_vec())?
        .add_source(config::File::from(file).required(false))
        .add_source(
            environment
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.cors_origins"),
        )
        .build()?;

    let settings = builder.try_deserialize::<AppSettings>()?;

    if settings.server.cors_origins.is_empty() {
        return Err(ConfigError::ValidationError(
            "server.cors_origins must list at least one origin".to_string(),
        ));
    }

    Ok(settings)
}

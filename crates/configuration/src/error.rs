use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("DATABASE_URL must be set to a PostgreSQL connection string.")]
    MissingDatabaseUrl,

    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

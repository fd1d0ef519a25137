use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres};
use std::borrow::Cow;
use std::str::FromStr;
use std::time::Duration;

/// How long a request waits for a free connection before giving up.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
/// Connections above the pool floor are closed after this much idle time.
const OVERFLOW_IDLE_TIMEOUT: Duration = Duration::from_secs(300);
/// Connections are recycled after this long.
const MAX_CONNECTION_LIFETIME: Duration = Duration::from_secs(1800);

/// The process-wide connection manager.
///
/// Built once at startup and handed to whoever needs sessions; cloning is
/// cheap because `PgPool` is reference counted.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

/// A pooled connection checked out for the duration of one request.
///
/// The connection goes back to the pool when the session is dropped, so it is
/// released on every exit path including cancellation.
#[derive(Debug)]
pub struct PgSession {
    pub(crate) conn: PoolConnection<Postgres>,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Checks a connection out of the pool.
    ///
    /// The pool pings the connection first, so a connection dropped by the
    /// server while idle is replaced instead of failing the request.
    pub async fn acquire_session(&self) -> Result<PgSession, DbError> {
        let conn = self.pool.acquire().await?;
        Ok(PgSession { conn })
    }
}

/// Creates the connection pool described by `settings`.
///
/// The pool is lazy: no connection is opened until the first request, so the
/// server can start while the database is still coming up. A malformed URL is
/// still rejected here.
pub fn connect(settings: &DatabaseSettings) -> Result<Database, DbError> {
    let url = normalize_database_url(&settings.url);
    let options = PgConnectOptions::from_str(&url)
        .map_err(|e| DbError::ConnectionConfigError(e.to_string()))?;

    let pool = pool_options(settings).connect_lazy_with(options);
    tracing::info!(
        pool_size = settings.pool_size,
        max_overflow = settings.max_overflow,
        "Database pool configured."
    );
    Ok(Database::new(pool))
}

/// Maps the "pool size + overflow" model onto sqlx's min/max connections.
pub fn pool_options(settings: &DatabaseSettings) -> PgPoolOptions {
    let max_connections = settings.pool_size.saturating_add(settings.max_overflow).max(1);
    PgPoolOptions::new()
        .min_connections(settings.pool_size.min(max_connections))
        .max_connections(max_connections)
        .test_before_acquire(true)
        .idle_timeout(OVERFLOW_IDLE_TIMEOUT)
        .max_lifetime(MAX_CONNECTION_LIFETIME)
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

/// Strips a driver suffix such as `+psycopg2` from the URL scheme.
///
/// Deployments that were configured for a Python driver keep working.
pub fn normalize_database_url(url: &str) -> Cow<'_, str> {
    let Some((scheme, rest)) = url.split_once("://") else {
        return Cow::Borrowed(url);
    };
    match scheme.split_once('+') {
        Some((base, _driver)) => Cow::Owned(format!("{base}://{rest}")),
        None => Cow::Borrowed(url),
    }
}

/// A utility function to apply the embedded migrations.
///
/// Only the bootstrap step calls this; the server never changes the schema.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

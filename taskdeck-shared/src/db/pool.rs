/// PostgreSQL connection pool management
///
/// Builds the sqlx connection pool used by every request handler and runs a
/// connectivity check before the pool is handed to the application, so a
/// misconfigured `DATABASE_URL` fails at startup rather than on the first
/// request.
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), sqlx::Error> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL").unwrap(),
///     ..Default::default()
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

/// Connection pool configuration
///
/// Timeouts are in seconds so the values can come straight from environment
/// variables.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum connections held by the pool
    pub max_connections: u32,

    /// Idle connections kept warm
    pub min_connections: u32,

    /// How long to wait when acquiring a connection (seconds)
    pub acquire_timeout_seconds: u64,

    /// Close connections idle longer than this (seconds); None = never
    pub idle_timeout_seconds: Option<u64>,

    /// Recycle connections older than this (seconds); None = never
    pub max_lifetime_seconds: Option<u64>,

    /// Ping connections before handing them out
    pub test_before_acquire: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 2,
            acquire_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
            max_lifetime_seconds: Some(1800),
            test_before_acquire: true,
        }
    }
}

/// Creates the connection pool and verifies the database is reachable
///
/// # Errors
///
/// Returns an error if the URL is invalid, the database cannot be reached,
/// or the health check query fails.
pub async fn create_pool(config: DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "creating database connection pool"
    );

    let mut options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .test_before_acquire(config.test_before_acquire);

    if let Some(secs) = config.idle_timeout_seconds {
        options = options.idle_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = config.max_lifetime_seconds {
        options = options.max_lifetime(Duration::from_secs(secs));
    }

    let pool = options.connect(&config.url).await?;
    health_check(&pool).await?;

    info!("database connection pool ready");
    Ok(pool)
}

/// Runs a `SELECT 1` against the pool
///
/// Used at startup and by the `/health` endpoint.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    debug!("running database health check");

    let (one,): (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;
    if one != 1 {
        return Err(sqlx::Error::Protocol(
            "health check returned unexpected value".into(),
        ));
    }

    Ok(())
}

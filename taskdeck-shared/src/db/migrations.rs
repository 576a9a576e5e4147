/// Database migration runner
///
/// Migrations live in `migrations/` at the crate root and are embedded into
/// the binary with `sqlx::migrate!`, so a deployed server can bring its own
/// schema up to date without shipping SQL files alongside it.

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{info, warn};

/// Applies all pending migrations
///
/// # Errors
///
/// Returns an error if a migration fails to apply; sqlx rolls the failing
/// migration back before returning.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("running database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("database schema is up to date");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "migration failed");
            Err(e)
        }
    }
}

/// Creates the database if it does not exist
///
/// Development convenience; production databases should be provisioned
/// ahead of time.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    }

    Ok(())
}

//! Embedded schema migrations.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use comhub_core::error::AppError;

/// Schema and seed migrations, embedded at compile time from `migrations/`.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Applies every migration not yet recorded in `_sqlx_migrations`.
/// Safe to run concurrently; sqlx serialises runners with an advisory lock.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!(known = MIGRATOR.iter().count(), "Applying database migrations");

    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| AppError::database("Failed to apply migrations", e))?;

    info!("Database schema is up to date");
    Ok(())
}

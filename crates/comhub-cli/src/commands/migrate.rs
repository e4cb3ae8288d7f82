//! Database migrations.

use sqlx::PgPool;

use comhub_core::error::AppError;

use crate::output;

/// Apply every pending migration.
pub async fn execute(pool: &PgPool) -> Result<(), AppError> {
    println!("Running database migrations...");
    comhub_database::migration::run_migrations(pool).await?;
    output::print_success("All migrations applied.");
    Ok(())
}

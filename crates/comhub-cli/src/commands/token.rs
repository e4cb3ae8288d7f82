//! Refresh token maintenance.

use std::sync::Arc;

use clap::{Args, Subcommand};
use sqlx::PgPool;

use comhub_auth::TokenSweeper;
use comhub_core::config::AppConfig;
use comhub_core::error::AppError;
use comhub_database::repositories::RefreshTokenRepository;

use crate::output;

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommand,
}

#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Delete refresh tokens past the retention window
    Sweep,
}

/// Execute token commands
pub async fn execute(args: &TokenArgs, config: &AppConfig, pool: &PgPool) -> Result<(), AppError> {
    match args.command {
        TokenCommand::Sweep => {
            let sweeper = TokenSweeper::new(
                &config.auth,
                Arc::new(RefreshTokenRepository::new(pool.clone())),
            );
            let deleted = sweeper.run_once().await?;
            output::print_success(&format!("Deleted {deleted} expired refresh tokens"));
        }
    }
    Ok(())
}

//! CLI command definitions and dispatch.

pub mod admin;
pub mod audit;
pub mod migrate;
pub mod seed;
pub mod token;
pub mod user;

use clap::{Parser, Subcommand};
use sqlx::PgPool;

use comhub_core::config::AppConfig;
use comhub_core::error::AppError;
use comhub_database::DatabasePool;

use crate::output::OutputFormat;

/// ComHub community platform administration
#[derive(Debug, Parser)]
#[command(name = "comhub-cli", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (selects `config/{env}.toml`)
    #[arg(short, long, env = "COMHUB_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Restore the baseline roles and their permissions
    Seed(seed::SeedArgs),
    /// Create a super-admin account
    CreateAdmin(admin::CreateAdminArgs),
    /// User management
    User(user::UserArgs),
    /// Audit log
    Audit(audit::AuditArgs),
    /// Refresh token maintenance
    Token(token::TokenArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.env)?;
        let pool = connect(&config).await?;

        match &self.command {
            Commands::Migrate => migrate::execute(&pool).await,
            Commands::Seed(args) => seed::execute(args, &pool).await,
            Commands::CreateAdmin(args) => admin::execute(args, &config, &pool).await,
            Commands::User(args) => user::execute(args, &pool, self.format).await,
            Commands::Audit(args) => audit::execute(args, &pool, self.format).await,
            Commands::Token(args) => token::execute(args, &config, &pool).await,
        }
    }
}

/// Connect to the configured database.
async fn connect(config: &AppConfig) -> Result<PgPool, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    Ok(pool.pool().clone())
}

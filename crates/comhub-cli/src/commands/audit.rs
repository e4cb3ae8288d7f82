//! Audit log commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use sqlx::PgPool;
use tabled::Tabled;
use uuid::Uuid;

use comhub_core::error::AppError;
use comhub_core::types::pagination::PageRequest;
use comhub_core::types::sorting::SortDirection;
use comhub_database::repositories::{AuditFilter, AuditLogRepository};

use crate::output::{self, OutputFormat};

/// Arguments for audit commands
#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Audit subcommand
    #[command(subcommand)]
    pub command: AuditCommand,
}

/// Audit subcommands
#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// Search the audit log, newest first
    Search {
        /// Filter by action, e.g. `user.roles_replaced`
        #[arg(short, long)]
        action: Option<String>,
        /// Filter by actor (user ID)
        #[arg(long)]
        actor: Option<Uuid>,
        /// Filter by target type, e.g. `registration`
        #[arg(short, long)]
        target_type: Option<String>,
        /// Number of results
        #[arg(short, long, default_value = "50")]
        limit: u64,
    },
}

/// Audit display row
#[derive(Debug, Serialize, Tabled)]
struct AuditRow {
    time: String,
    actor: String,
    action: String,
    target: String,
    ip: String,
}

/// Execute audit commands
pub async fn execute(
    args: &AuditArgs,
    pool: &PgPool,
    format: OutputFormat,
) -> Result<(), AppError> {
    let audit = AuditLogRepository::new(pool.clone());

    match &args.command {
        AuditCommand::Search {
            action,
            actor,
            target_type,
            limit,
        } => {
            let filter = AuditFilter {
                actor_id: *actor,
                action: action.clone(),
                target_type: target_type.clone(),
                ..Default::default()
            };
            let result = audit
                .search(&filter, SortDirection::Desc, PageRequest::new(1, *limit))
                .await?;

            let rows: Vec<AuditRow> = result
                .items
                .iter()
                .map(|e| AuditRow {
                    time: e.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    actor: e.actor_id.map(|id| id.to_string()).unwrap_or_else(|| "system".into()),
                    action: e.action.clone(),
                    target: match e.target_id {
                        Some(id) => format!("{}:{id}", e.target_type),
                        None => e.target_type.clone(),
                    },
                    ip: e.ip_address.clone().unwrap_or_default(),
                })
                .collect();

            output::print_list(&rows, format);
        }
    }

    Ok(())
}

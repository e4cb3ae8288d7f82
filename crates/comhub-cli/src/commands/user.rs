//! User management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use sqlx::PgPool;
use tabled::Tabled;

use comhub_core::error::AppError;
use comhub_core::types::filter::TextSearch;
use comhub_core::types::pagination::PageRequest;
use comhub_core::types::sorting::{SortDirection, SortField, SortSpec};
use comhub_database::repositories::{USER_SORT, UserFilter, UserRepository};
use comhub_entity::user::UpdateUser;

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List users
    List {
        /// Match email or display name
        #[arg(short, long)]
        query: Option<String>,
        /// Only users holding this role
        #[arg(short, long)]
        role: Option<String>,
        /// Sort tokens, e.g. `created_at:desc,email`
        #[arg(short, long)]
        sort: Option<String>,
        #[arg(long, default_value = "1")]
        page: u64,
        #[arg(long, default_value = "20")]
        page_size: u64,
    },
    /// Deactivate a user and revoke their refresh tokens
    Deactivate {
        /// Email of the user
        email: String,
    },
    /// Reactivate a user
    Activate {
        /// Email of the user
        email: String,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    active: bool,
    super_admin: bool,
    last_login: String,
}

/// Execute user commands
pub async fn execute(args: &UserArgs, pool: &PgPool, format: OutputFormat) -> Result<(), AppError> {
    let users = UserRepository::new(pool.clone());

    match &args.command {
        UserCommand::List {
            query,
            role,
            sort,
            page,
            page_size,
        } => {
            let sort = SortSpec::parse(
                sort.as_deref(),
                USER_SORT,
                SortField {
                    column: "u.created_at",
                    direction: SortDirection::Desc,
                },
            )?;
            let filter = UserFilter {
                search: TextSearch::from_param(query.as_deref()),
                is_active: None,
                role: role.clone(),
            };
            let result = users
                .list(&filter, &sort, PageRequest::new(*page, *page_size))
                .await?;

            let rows: Vec<UserRow> = result
                .items
                .iter()
                .map(|u| UserRow {
                    id: u.id.to_string(),
                    email: u.email.clone(),
                    name: u.display_name.clone().unwrap_or_default(),
                    active: u.is_active,
                    super_admin: u.is_super_admin,
                    last_login: output::format_time(u.last_login_at),
                })
                .collect();

            output::print_list(&rows, format);
            output::print_page(result.page, result.total_pages, result.total_items, format);
        }
        UserCommand::Deactivate { email } => {
            let (user, revoked) = set_active(&users, email, false).await?;
            output::print_success(&format!("User '{}' deactivated", user.email));
            output::print_kv("revoked refresh tokens", &revoked.to_string());
        }
        UserCommand::Activate { email } => {
            let (user, _) = set_active(&users, email, true).await?;
            output::print_success(&format!("User '{}' activated", user.email));
        }
    }

    Ok(())
}

async fn set_active(
    users: &UserRepository,
    email: &str,
    active: bool,
) -> Result<(comhub_entity::user::User, u64), AppError> {
    let user = users
        .find_by_email(&email.trim().to_lowercase())
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{email}' not found")))?;
    if user.is_active == active {
        output::print_warning("Nothing to change");
        return Ok((user, 0));
    }
    users
        .update(
            user.id,
            &UpdateUser {
                is_active: Some(active),
                ..Default::default()
            },
        )
        .await
}

//! Super-admin bootstrap.

use clap::Args;
use sqlx::PgPool;

use comhub_auth::{PasswordHasher, PasswordValidator};
use comhub_core::config::AppConfig;
use comhub_core::error::AppError;
use comhub_database::repositories::UserRepository;
use comhub_entity::user::CreateUser;

use crate::output;

/// Arguments for `create-admin`
#[derive(Debug, Args)]
pub struct CreateAdminArgs {
    /// Email (will prompt if not provided)
    #[arg(short, long)]
    pub email: Option<String>,
    /// Display name
    #[arg(short, long)]
    pub name: Option<String>,
    /// Password (will prompt if not provided)
    #[arg(short, long)]
    pub password: Option<String>,
}

fn input_error(e: dialoguer::Error) -> AppError {
    AppError::internal(format!("Input error: {e}"))
}

/// Execute `create-admin`
pub async fn execute(
    args: &CreateAdminArgs,
    config: &AppConfig,
    pool: &PgPool,
) -> Result<(), AppError> {
    let users = UserRepository::new(pool.clone());
    let validator = PasswordValidator::new(&config.auth);

    let email = match &args.email {
        Some(e) => e.clone(),
        None => dialoguer::Input::<String>::new()
            .with_prompt("Admin email")
            .interact_text()
            .map_err(input_error)?,
    };
    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::invalid_field("email", "must be a valid email address"));
    }

    let password = match &args.password {
        Some(p) => p.clone(),
        None => dialoguer::Password::new()
            .with_prompt("Admin password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()
            .map_err(input_error)?,
    };
    validator.validate("password", &password)?;

    let password_hash = PasswordHasher::new().hash_password(&password)?;
    let user = users
        .create(&CreateUser {
            email: email.clone(),
            password_hash: Some(password_hash),
            display_name: args.name.clone(),
            is_super_admin: true,
        })
        .await?;

    output::print_success(&format!("Super-admin '{email}' created"));
    output::print_kv("id", &user.id.to_string());
    Ok(())
}

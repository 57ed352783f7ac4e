//! Admin user management commands.
//!
//! # Environment Variables
//!
//! - `KAVKA_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use sqlx::PgPool;
use thiserror::Error;

use kavka_core::Email;
use kavka_web::db::users::UserRepository;
use kavka_web::services::auth;

/// Errors that can occur during user management.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: set KAVKA_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    /// Invalid email address.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] kavka_core::EmailError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] kavka_web::db::RepositoryError),

    /// Authentication error (weak password, hashing failure).
    #[error("{0}")]
    Auth(#[from] auth::AuthError),
}

/// Create a new admin user.
///
/// # Errors
///
/// Returns `UserError` on invalid input, hashing failure, or a database
/// error (including a duplicate email).
pub async fn create(email: &str, name: &str, password: &str) -> Result<(), UserError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email)?;
    let password_hash = auth::hash_password(password)?;

    let database_url = std::env::var("KAVKA_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| UserError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url)
        .await
        .map_err(kavka_web::db::RepositoryError::from)?;

    let user = UserRepository::new(&pool)
        .create(name, &email, &password_hash)
        .await?;

    tracing::info!("Admin user created:");
    tracing::info!("  ID:    {}", user.id);
    tracing::info!("  Name:  {}", user.name);
    tracing::info!("  Email: {}", user.email);

    Ok(())
}

/// Print the Argon2id hash of a password, for manual SQL inserts.
///
/// # Errors
///
/// Returns `UserError::Auth` if hashing fails.
pub fn hash_password(password: &str) -> Result<(), UserError> {
    let hash = auth::hash_password(password)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{hash}");
    }

    Ok(())
}

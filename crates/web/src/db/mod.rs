//! Database operations for the site's `PostgreSQL` instance.
//!
//! # Tables
//!
//! - `post` - content posts; the `(key, version)` pair is unique, the row
//!   with `version = 'current'` is live and every save archives the prior
//!   current row under a timestamp version label (append-only history)
//! - `site_user` - admin accounts with password hashes and one-time
//!   password-reset token hashes
//! - `tower_sessions.session` - tower-sessions storage
//!
//! # Migrations
//!
//! Migrations live in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p kavka-cli -- migrate
//! ```

pub mod posts;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

//! Admin user domain types.
//!
//! These types represent validated domain objects separate from database
//! row types.

use chrono::{DateTime, Utc};

use kavka_core::{Email, UserId};

/// An admin user (domain type).
///
/// The site has no public accounts; users exist only to edit content.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name shown in the admin panel.
    pub name: String,
    /// User's email address; also the login identifier.
    pub email: Email,
    /// Role label (e.g. "admin").
    pub role: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

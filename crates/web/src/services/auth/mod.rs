//! Authentication service.
//!
//! Password login for admin users plus the email-driven password-reset
//! flow. Reset tokens are single-use: only the SHA-256 digest of the raw
//! token is stored, alongside a one-hour expiry, and starting a new reset
//! supersedes any earlier one.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use rand::distr::{Alphanumeric, SampleString};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use kavka_core::Email;

use crate::db::users::UserRepository;
use crate::models::user::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Length of the raw reset token.
const RESET_TOKEN_LENGTH: usize = 32;

/// How long a reset token stays valid.
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// A started password reset.
#[derive(Debug)]
pub struct PasswordReset {
    /// The user the reset belongs to.
    pub user: User,
    /// Short human-readable label shown in the UI and the mail subject,
    /// so the visitor can match a mail to their request.
    pub label: String,
    /// The raw token for the change-password link. Never stored.
    pub token: String,
}

/// Authentication service for the admin panel.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password pair
    /// is wrong; the error does not distinguish an unknown email from a
    /// wrong password.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Start a password reset for an email address.
    ///
    /// Stores the token digest and expiry on the user row; the caller
    /// mails the raw token. Any earlier token is superseded.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the email is unknown; the
    /// route layer must not leak that distinction to the visitor.
    pub async fn start_password_reset(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<PasswordReset, AuthError> {
        let email = Email::parse(email)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let token = Alphanumeric.sample_string(&mut rand::rng(), RESET_TOKEN_LENGTH);
        let label = reset_label(&token);
        let expires_at = now + Duration::hours(RESET_TOKEN_TTL_HOURS);

        self.users
            .set_reset_token(user.id, &token_digest(&token), expires_at)
            .await?;

        Ok(PasswordReset { user, label, token })
    }

    /// Verify a raw reset token, returning its user while leaving the
    /// token in place (used to render the change-password form).
    ///
    /// # Errors
    ///
    /// `AuthError::ResetTokenInvalid` for unknown or superseded tokens,
    /// `AuthError::ResetTokenExpired` past the expiry.
    pub async fn verify_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<User, AuthError> {
        let (user, expires_at) = self
            .users
            .get_by_reset_token(&token_digest(token))
            .await?
            .ok_or(AuthError::ResetTokenInvalid)?;

        if expires_at < now {
            return Err(AuthError::ResetTokenExpired);
        }

        Ok(user)
    }

    /// Complete a password reset: consume the token and set the new
    /// password.
    ///
    /// # Errors
    ///
    /// Token errors as in [`Self::verify_reset_token`], plus
    /// `AuthError::WeakPassword` if the new password fails validation.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> Result<User, AuthError> {
        let user = self.verify_reset_token(token, now).await?;

        validate_password(new_password)?;
        let password_hash = hash_password(new_password)?;

        // Clears the token columns in the same statement.
        self.users.set_password_hash(user.id, &password_hash).await?;

        Ok(user)
    }
}

/// Short uppercase label identifying a reset request.
#[must_use]
pub fn reset_label(token: &str) -> String {
    token.chars().take(6).collect::<String>().to_uppercase()
}

/// A plausible reset label for an email that matched no user; shown so
/// the response is indistinguishable from a real reset.
#[must_use]
pub fn fake_reset_label() -> String {
    reset_label(&Alphanumeric.sample_string(&mut rand::rng(), 6))
}

/// SHA-256 hex digest of a raw reset token.
fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_reset_label_is_six_uppercase_chars() {
        let label = reset_label("a1b2c3d4e5f6");
        assert_eq!(label, "A1B2C3");

        let fake = fake_reset_label();
        assert_eq!(fake.len(), 6);
        assert_eq!(fake, fake.to_uppercase());
    }

    #[test]
    fn test_token_digest_is_stable_hex() {
        let digest = token_digest("sometoken");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, token_digest("sometoken"));
        assert_ne!(digest, token_digest("othertoken"));
    }
}

//! Authentication extractor for the admin panel.
//!
//! Every `/admin` handler except the sign-in flow takes [`RequireAdmin`];
//! anonymous visitors are redirected to the login form.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::CurrentAdmin;
use crate::models::session::keys;

/// Extractor that requires a logged-in admin.
///
/// If nobody is logged in, HTML requests are redirected to the login
/// page with the original path as the `backlink` so login can return
/// the visitor where they were headed.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

/// Rejection for unauthenticated admin requests.
pub enum AdminRejection {
    /// Redirect to login page, remembering where the visitor was going.
    RedirectToLogin { backlink: String },
    /// Session layer missing entirely.
    Unauthorized,
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { backlink } => {
                let target = format!(
                    "/admin/sign/in?backlink={}",
                    url::form_urlencoded::byte_serialize(backlink.as_bytes()).collect::<String>()
                );
                Redirect::to(&target).into_response()
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminRejection::Unauthorized)?;

        let admin: CurrentAdmin = session
            .get(keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| AdminRejection::RedirectToLogin {
                backlink: parts.uri.path().to_string(),
            })?;

        Ok(Self(admin))
    }
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin on logout.
///
/// Flushes the whole session so the store record is deleted and the
/// session id is cycled.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use kavka_core::{Email, UserId};

    use super::*;

    #[tokio::test]
    async fn test_clear_current_admin_deletes_session_state() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let admin = CurrentAdmin {
            id: UserId::from(1),
            email: Email::parse("admin@kavkabistro.cz").expect("valid email"),
            name: "Jan".to_string(),
        };

        set_current_admin(&session, &admin).await.expect("insert");
        session.save().await.expect("save");

        clear_current_admin(&session).await.expect("flush");

        let loaded: Option<CurrentAdmin> =
            session.get(keys::CURRENT_ADMIN).await.expect("session read");
        assert!(loaded.is_none());
    }
}

//! Admin sign-in, sign-out and password-reset handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::{Expiry, Session};
use tracing::instrument;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::middleware::session::REMEMBER_ME_SECONDS;
use crate::models::CurrentAdmin;
use crate::services::auth::{AuthError, AuthService, fake_reset_label};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
    pub backlink: Option<String>,
}

/// Password reset request form data.
#[derive(Debug, Deserialize)]
pub struct ResetRequestForm {
    pub email: String,
}

/// Change password form data.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    pub token: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display on the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub success: Option<String>,
    pub backlink: Option<String>,
}

/// Query parameters carrying the raw reset token.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
    pub backlink: Option<String>,
}

/// Password reset request page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/reset.html")]
pub struct ResetTemplate {
    pub error: Option<String>,
    /// Label of the reset that was just started, shown after submit.
    pub sent_label: Option<String>,
}

/// Change password page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/change_password.html")]
pub struct ChangePasswordTemplate {
    pub token: String,
    pub error: Option<String>,
}

// =============================================================================
// Sign In / Sign Out
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<LoginQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error,
        success: query.success,
        backlink: query.backlink,
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AuthService::new(state.pool());

    match auth.authenticate(&form.email, &form.password).await {
        Ok(user) => {
            let admin = CurrentAdmin {
                id: user.id,
                email: user.email.clone(),
                name: user.name.clone(),
            };

            if let Err(e) = set_current_admin(&session, &admin).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/admin/sign/in?error=session").into_response();
            }

            if form.remember {
                session.set_expiry(Some(Expiry::OnInactivity(
                    tower_sessions::cookie::time::Duration::seconds(REMEMBER_ME_SECONDS),
                )));
            }

            set_sentry_user(&user.id, Some(user.email.as_str()));
            tracing::info!(user = %user.email, "Admin signed in");

            Redirect::to(sanitize_backlink(form.backlink.as_deref())).into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {}", e);
            let target = form.backlink.as_deref().map_or_else(
                || "/admin/sign/in?error=credentials".to_string(),
                |backlink| {
                    format!(
                        "/admin/sign/in?error=credentials&backlink={}",
                        url::form_urlencoded::byte_serialize(backlink.as_bytes())
                            .collect::<String>()
                    )
                },
            );
            Redirect::to(&target).into_response()
        }
    }
}

/// Handle logout.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();

    Redirect::to("/admin/sign/in?success=signed_out").into_response()
}

/// Only resume navigation inside the admin panel; anything else falls
/// back to the dashboard so the backlink cannot become an open redirect.
fn sanitize_backlink(backlink: Option<&str>) -> &str {
    match backlink {
        Some(path) if path.starts_with("/admin") && !path.starts_with("//") => path,
        _ => "/admin",
    }
}

// =============================================================================
// Password Reset
// =============================================================================

/// Display the password reset request page.
pub async fn reset_page() -> impl IntoResponse {
    ResetTemplate {
        error: None,
        sent_label: None,
    }
}

/// Handle a password reset request.
///
/// The confirmation never reveals whether the address belongs to a
/// user. Unknown addresses get a plausible label and no email.
#[instrument(skip(state, form))]
pub async fn reset_request(
    State(state): State<AppState>,
    Form(form): Form<ResetRequestForm>,
) -> Response {
    let auth = AuthService::new(state.pool());

    let label = match auth.start_password_reset(&form.email, chrono::Utc::now()).await {
        Ok(reset) => {
            if let Some(email) = state.email() {
                let reset_url = format!(
                    "{}/admin/sign/change-password?token={}",
                    state.config().base_url,
                    reset.token
                );
                if let Err(e) = email
                    .send_password_reset(reset.user.email.as_str(), &reset.label, &reset_url)
                    .await
                {
                    tracing::error!("Failed to send reset email: {}", e);
                }
            } else {
                tracing::warn!("SMTP not configured, reset email not sent");
            }

            reset.label
        }
        Err(AuthError::UserNotFound | AuthError::InvalidEmail(_)) => {
            tracing::info!("Password reset requested for unknown address");
            fake_reset_label()
        }
        Err(e) => {
            tracing::error!("Password reset failed: {}", e);
            return ResetTemplate {
                error: Some("Something went wrong, please try again".to_string()),
                sent_label: None,
            }
            .into_response();
        }
    };

    ResetTemplate {
        error: None,
        sent_label: Some(label),
    }
    .into_response()
}

/// Display the change password form after verifying the token.
#[instrument(skip(state, query))]
pub async fn change_password_page(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let auth = AuthService::new(state.pool());

    match auth.verify_reset_token(&query.token, chrono::Utc::now()).await {
        Ok(_) => ChangePasswordTemplate {
            token: query.token,
            error: None,
        }
        .into_response(),
        Err(e @ (AuthError::ResetTokenInvalid | AuthError::ResetTokenExpired)) => {
            tracing::warn!("Reset token rejected: {}", e);
            ResetTemplate {
                error: Some(reset_token_message(&e).to_string()),
                sent_label: None,
            }
            .into_response()
        }
        Err(e) => crate::error::AppError::from(e).into_response(),
    }
}

/// Handle the change password submission.
#[instrument(skip(state, form))]
pub async fn change_password(
    State(state): State<AppState>,
    Form(form): Form<ChangePasswordForm>,
) -> Response {
    if form.password != form.password_confirm {
        return ChangePasswordTemplate {
            token: form.token,
            error: Some("Passwords do not match".to_string()),
        }
        .into_response();
    }

    let auth = AuthService::new(state.pool());

    match auth
        .reset_password(&form.token, &form.password, chrono::Utc::now())
        .await
    {
        Ok(user) => {
            tracing::info!(user = %user.email, "Password changed via reset token");
            Redirect::to("/admin/sign/in?success=password_changed").into_response()
        }
        Err(e @ AuthError::WeakPassword(_)) => ChangePasswordTemplate {
            token: form.token,
            error: Some(e.to_string()),
        }
        .into_response(),
        Err(e @ (AuthError::ResetTokenInvalid | AuthError::ResetTokenExpired)) => {
            tracing::warn!("Reset token rejected: {}", e);
            ResetTemplate {
                error: Some(reset_token_message(&e).to_string()),
                sent_label: None,
            }
            .into_response()
        }
        Err(e) => crate::error::AppError::from(e).into_response(),
    }
}

const fn reset_token_message(err: &AuthError) -> &'static str {
    match err {
        AuthError::ResetTokenExpired => "The reset link has expired, please request a new one",
        _ => "The reset link is not valid, please request a new one",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_backlink() {
        assert_eq!(sanitize_backlink(Some("/admin/post/detail/lunch")), "/admin/post/detail/lunch");
        assert_eq!(sanitize_backlink(Some("https://evil.example")), "/admin");
        assert_eq!(sanitize_backlink(Some("//evil.example")), "/admin");
        assert_eq!(sanitize_backlink(None), "/admin");
    }
}

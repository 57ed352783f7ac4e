//! Admin post editing handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use kavka_core::apply_publish_intent;

use crate::db::posts::PostRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{Post, PostDraft};
use crate::state::AppState;

/// Format accepted by `<input type="datetime-local">`.
const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Post edit form data.
#[derive(Debug, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub publish_now: bool,
    pub published_from: Option<String>,
    pub published_to: Option<String>,
    pub content_cs: String,
    pub content_en: String,
}

/// Query parameters for flash messages.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Post edit page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/post_edit.html")]
pub struct PostEditTemplate {
    pub post: Post,
    pub publish_now: bool,
    pub versions: Vec<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the edit form for a post.
#[instrument(skip(state, _admin))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(key): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Result<PostEditTemplate> {
    let repository = PostRepository::new(state.pool());

    let post = repository
        .get_by_key(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(key.clone()))?;
    let versions = repository.versions(&key).await?;

    Ok(PostEditTemplate {
        publish_now: post.is_published(Utc::now()),
        post,
        versions,
        error: query.error,
        success: query.success,
    })
}

/// Handle the edit form submission.
///
/// Validates the publish intent against the dates, archives the current
/// version, writes the draft, and drops the cached copy so the public
/// site picks the change up immediately. The site owner gets a
/// notification email when one is configured.
#[instrument(skip(state, admin, form))]
pub async fn save(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(key): Path<String>,
    Form(form): Form<PostForm>,
) -> Result<Response> {
    let now = Utc::now();

    let from = parse_input_datetime(form.published_from.as_deref())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let to = parse_input_datetime(form.published_to.as_deref())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let window = match apply_publish_intent(form.publish_now, from, to, now) {
        Ok(window) => window,
        Err(e) => {
            let target = format!(
                "/admin/post/detail/{key}?error={}",
                url::form_urlencoded::byte_serialize(e.to_string().as_bytes())
                    .collect::<String>()
            );
            return Ok(Redirect::to(&target).into_response());
        }
    };

    let draft = PostDraft {
        window,
        content_cs: form.content_cs,
        content_en: form.content_en,
    };

    let post = state.posts().save(&key, &draft, admin.id, now).await?;
    tracing::info!(key = %key, editor = %admin.email, "Post saved");

    if let (Some(email), Some(notify)) = (state.email(), state.config().notify_email.as_deref()) {
        let edit_url = format!("{}/admin/post/detail/{key}", state.config().base_url);
        if let Err(e) = email
            .send_post_change_notification(notify, &post.key, admin.email.as_str(), &edit_url)
            .await
        {
            tracing::error!("Failed to send post change notification: {}", e);
        }
    }

    Ok(Redirect::to(&format!("/admin/post/detail/{key}?success=saved")).into_response())
}

/// Parse an optional `datetime-local` input value. Empty strings count
/// as absent; the value is interpreted as UTC.
fn parse_input_datetime(
    value: Option<&str>,
) -> std::result::Result<Option<DateTime<Utc>>, chrono::ParseError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDateTime::parse_from_str(value, INPUT_FORMAT)
            .map(|naive| Some(naive.and_utc())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_datetime() {
        assert_eq!(parse_input_datetime(None).unwrap(), None);
        assert_eq!(parse_input_datetime(Some("")).unwrap(), None);
        assert_eq!(parse_input_datetime(Some("  ")).unwrap(), None);

        let parsed = parse_input_datetime(Some("2025-06-15T18:30")).unwrap().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-06-15T18:30:00+00:00");

        assert!(parse_input_datetime(Some("not a date")).is_err());
    }
}

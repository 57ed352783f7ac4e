//! Admin dashboard: overview of all posts and their publication state.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use kavka_core::PublishStatus;

use crate::db::posts::PostRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Query parameters for flash messages.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// One row in the dashboard post listing.
pub struct PostRow {
    pub key: String,
    pub title: String,
    pub status: PublishStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub admin_name: String,
    pub posts: Vec<PostRow>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the dashboard.
#[instrument(skip(state, admin))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<MessageQuery>,
) -> Result<DashboardTemplate> {
    let now = chrono::Utc::now();
    let posts = PostRepository::new(state.pool())
        .list()
        .await?
        .into_iter()
        .map(|post| PostRow {
            status: post.status(now),
            key: post.key,
            title: post.title,
            created_at: post.created_at,
        })
        .collect();

    Ok(DashboardTemplate {
        admin_name: admin.name,
        posts,
        error: query.error,
        success: query.success,
    })
}

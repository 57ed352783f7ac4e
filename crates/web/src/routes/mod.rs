//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to the preferred language homepage
//! GET  /{lang}                 - Homepage in a language
//! GET  /{slug}                 - Bare slug, redirects to its canonical URL
//! GET  /{lang}/{slug}          - Public page (canonical form)
//!
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the database)
//!
//! # Admin panel
//! GET  /admin                  - Dashboard (requires auth)
//! GET  /admin/post/detail/{key}  - Post edit form (requires auth)
//! POST /admin/post/detail/{key}  - Save a post (requires auth)
//! GET  /admin/sign/in          - Login page
//! POST /admin/sign/in          - Login action
//! POST /admin/sign/out         - Logout action
//! GET  /admin/sign/reset       - Password reset request page
//! POST /admin/sign/reset       - Start a password reset
//! GET  /admin/sign/change-password - Change password form (token in query)
//! POST /admin/sign/change-password - Complete a password reset
//! ```

pub mod admin;
pub mod pages;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/admin", admin::routes())
        .route("/", get(pages::root))
        .route("/{first}", get(pages::one_segment))
        .route("/{lang}/{slug}", get(pages::two_segments))
}

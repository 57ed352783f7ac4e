//! Admin panel route handlers.

pub mod auth;
pub mod dashboard;
pub mod posts;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the admin routes router, mounted under `/admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/post/detail/{key}", get(posts::edit_page).post(posts::save))
        .route("/sign/in", get(auth::login_page).post(auth::login))
        .route("/sign/out", post(auth::logout))
        .route("/sign/reset", get(auth::reset_page).post(auth::reset_request))
        .route(
            "/sign/change-password",
            get(auth::change_password_page).post(auth::change_password),
        )
}

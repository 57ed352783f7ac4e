//! Domain types for the web crate.

pub mod post;
pub mod session;
pub mod user;

pub use post::{Post, PostDraft};
pub use session::CurrentAdmin;
pub use user::User;

//! Shared newtype wrappers and closed enums.

mod email;
mod id;
mod lang;

pub use email::{Email, EmailError};
pub use id::UserId;
pub use lang::{Lang, LangError};

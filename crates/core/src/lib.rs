//! Kavka Core - Shared types and domain logic.
//!
//! This crate provides the pieces of the Kavka bistro site that are pure
//! logic over static data:
//!
//! - [`types`] - Newtype wrappers and closed enums ([`Lang`], [`Email`], IDs)
//! - [`sitemap`] - The page/language resolver with canonical-URL redirects
//! - [`publication`] - Time-windowed publish/expire state for content posts
//!
//! # Architecture
//!
//! The core crate contains no I/O, no database access, and no HTTP types.
//! Everything here is a deterministic function of its inputs, which keeps
//! the branching logic of the site testable without a running server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod publication;
pub mod sitemap;
pub mod types;

pub use publication::{PublishError, PublishStatus, PublishWindow, apply_publish_intent};
pub use sitemap::{PageKey, Resolution, ResolveError, SiteMap, SlugMapping};
pub use types::*;

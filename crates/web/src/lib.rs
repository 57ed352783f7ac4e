//! Kavka Bistro web library.
//!
//! This crate provides the whole site as a library so the CLI can reuse
//! the repositories and password hashing, and so handlers can be tested.
//!
//! # Architecture
//!
//! - Axum web framework with Askama server-side rendering
//! - Bilingual public pages under `/{lang}/{slug}` with localized slugs
//! - Admin panel under `/admin` with session authentication
//! - `PostgreSQL` for posts, users, and sessions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

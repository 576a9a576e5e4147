//! # Taskdeck Shared Library
//!
//! Shared types and business logic used by the taskdeck API server.
//!
//! ## Module Organization
//!
//! - `models`: database models (users, tasks) and listing queries
//! - `lifecycle`: task validation and status-derivation rules
//! - `analytics`: dashboard aggregation over a user's tasks
//! - `auth`: password hashing and JWT tokens
//! - `db`: connection pool and migrations

pub mod analytics;
pub mod auth;
pub mod db;
pub mod lifecycle;
pub mod models;

/// Current version of the taskdeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

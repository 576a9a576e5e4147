/// API route handlers
///
/// - `health`: liveness check
/// - `auth`: registration, login, token refresh, profile
/// - `tasks`: task CRUD with filtering and sorting
/// - `analytics`: dashboard summaries

pub mod analytics;
pub mod auth;
pub mod health;
pub mod tasks;

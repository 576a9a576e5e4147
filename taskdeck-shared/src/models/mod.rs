/// Database models
///
/// # Models
///
/// - `user`: user accounts and authentication data
/// - `task`: user-owned tasks plus the filtered/sorted listing queries

pub mod task;
pub mod user;

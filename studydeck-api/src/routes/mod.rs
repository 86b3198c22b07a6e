/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Liveness check
/// - `auth`: Registration, login, profile
/// - `tasks`: Task CRUD and dashboard statistics

pub mod auth;
pub mod health;
pub mod tasks;

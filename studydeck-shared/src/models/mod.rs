/// Database models for StudyDeck
///
/// # Models
///
/// - `user`: User accounts (registration, login, profile lookup)
/// - `task`: Tasks owned by users, plus the filter/sort query builder
///
/// Every task query is scoped by the owning user's id; the filter types make
/// it impossible to build an unscoped task query.

pub mod task;
pub mod user;

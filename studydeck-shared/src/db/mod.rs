/// Database layer for StudyDeck
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management
/// - `migrations`: sqlx migration runner (schema lives in `migrations/` at
///   the workspace root)
///
/// Models live in the `models` module at the crate root.

pub mod migrations;
pub mod pool;

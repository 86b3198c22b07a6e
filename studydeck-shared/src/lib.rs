//! # StudyDeck Shared Library
//!
//! This crate contains the types and business logic shared by the StudyDeck
//! API server and any future binaries (seeders, admin tools).
//!
//! ## Module Organization
//!
//! - `models`: Database models and the task query builder
//! - `auth`: Credential validation, password hashing, JWT, middleware
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the StudyDeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

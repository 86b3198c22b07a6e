/// Authentication utilities for StudyDeck
///
/// This module groups everything needed to authenticate a user:
///
/// - `validation`: pure credential shape/strength checks
/// - `password`: Argon2id hashing and verification
/// - `jwt`: token issuance and validation
/// - `middleware`: axum layer that turns a Bearer token into an `AuthContext`
///
/// # Flow
///
/// ```text
/// register: validation -> password::hash_password -> jwt::create_token
/// login:    validation -> password::verify_password -> jwt::create_token
/// request:  middleware -> jwt::validate_token -> AuthContext in extensions
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod validation;

/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a new user
/// - `POST /auth/login` - Login and get a token
/// - `GET /auth/me` - Current user's profile (requires Bearer token)
///
/// Both register and login reject malformed-looking emails before touching
/// the store. Login collapses "no such user" and "wrong password" into one
/// indistinguishable message so callers cannot enumerate accounts.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use studydeck_shared::{
    auth::{jwt, middleware::AuthContext, password, validation},
    models::user::{CreateUser, PublicUser, User},
};
use validator::Validate;

/// Rejection message for emails failing the shape check.
const MSG_INVALID_EMAIL: &str = "Invalid email address";

/// Rejection message for weak passwords; spells out the rules.
const MSG_WEAK_PASSWORD: &str = "Password must be at least 6 characters, \
                                 contain one letter, one number and one special character";

/// Generic message covering both unknown email and wrong password.
const MSG_INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Email address (validated against the credential rules, not here)
    pub email: String,

    /// Password (validated against the strength rules, not here)
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,

    /// Password
    pub password: String,
}

/// Response shape shared by register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Signed identity token (7-day validity)
    pub token: String,

    /// Public profile of the authenticated user
    pub user: PublicUser,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// { "name": "Jo", "email": "jo@example.com", "password": "abc12!" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: invalid email, weak password, or email already taken
/// - `500 Internal Server Error`: store failure
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    // Credential checks come first; name bounds are secondary
    if !validation::validate_email(&req.email) {
        return Err(ApiError::BadRequest(MSG_INVALID_EMAIL.to_string()));
    }

    if !validation::validate_password(&req.password) {
        return Err(ApiError::BadRequest(MSG_WEAK_PASSWORD.to_string()));
    }

    req.validate()
        .map_err(|e| ApiError::BadRequest(first_validation_message(&e)))?;

    // Case-sensitive exact match on the stored email
    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    let token = jwt::create_token(&jwt::Claims::new(user.id), state.jwt_secret())?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.public(),
        }),
    ))
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// { "email": "jo@example.com", "password": "abc12!" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: invalid email shape, or the single generic
///   "Invalid credentials" for unknown email / wrong password alike
/// - `500 Internal Server Error`: store failure
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    if !validation::validate_email(&req.email) {
        return Err(ApiError::BadRequest(MSG_INVALID_EMAIL.to_string()));
    }

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::BadRequest(MSG_INVALID_CREDENTIALS.to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::BadRequest(MSG_INVALID_CREDENTIALS.to_string()));
    }

    let token = jwt::create_token(&jwt::Claims::new(user.id), state.jwt_secret())?;

    Ok(Json(AuthResponse {
        token,
        user: user.public(),
    }))
}

/// Current user's profile
///
/// The token may outlive the account (there is no revocation), so the id can
/// fail to resolve here even though authentication succeeded.
///
/// # Endpoint
///
/// ```text
/// GET /auth/me
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: missing or invalid token
/// - `404 Not Found`: the user behind the token no longer exists
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.public()))
}

/// Flattens validator output into the first human-readable message.
fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| "Validation failed".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_name_bounds() {
        let req = RegisterRequest {
            name: "".to_string(),
            email: "a@b.c".to_string(),
            password: "abc12!".to_string(),
        };
        assert!(req.validate().is_err());

        let req = RegisterRequest {
            name: "Jo".to_string(),
            email: "a@b.c".to_string(),
            password: "abc12!".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_first_validation_message_picks_configured_text() {
        let req = RegisterRequest {
            name: "".to_string(),
            email: "a@b.c".to_string(),
            password: "abc12!".to_string(),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(first_validation_message(&errors), "Name must be 1-100 characters");
    }
}

/**
 * Login Handler
 *
 * This module implements the user authentication handler for POST /api/auth/login.
 *
 * # Authentication Process
 *
 * 1. Look up user by email
 * 2. Verify password using bcrypt
 * 3. Generate JWT token and set the session cookie
 * 4. Return the profile and token
 *
 * Unknown emails and wrong passwords produce the same 400 response.
 */

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header::SET_COOKIE,
    response::{IntoResponse, Json},
};
use bcrypt::verify;

use crate::backend::auth::sessions::session_cookie;
use crate::backend::auth::users::get_user_by_email;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::auth::{AuthResponse, LoginRequest};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Login handler
///
/// # Errors
///
/// * `400 Bad Request` - Missing fields, unknown email or wrong password
/// * `503 Service Unavailable` - If database is not configured
/// * `500 Internal Server Error` - If the query or token generation fails
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BackendError> {
    let Json(request) = payload?;
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(BackendError::bad_request("Email and password are required"));
    }

    let pool = state.pool()?;
    tracing::info!("Login request for: {}", request.email.trim());

    let user = get_user_by_email(pool, &request.email).await?.ok_or_else(|| {
        tracing::warn!("User not found: {}", request.email.trim());
        BackendError::bad_request(INVALID_CREDENTIALS)
    })?;

    if !verify(&request.password, &user.password_hash)? {
        tracing::warn!("Invalid password for user: {}", user.email);
        return Err(BackendError::bad_request(INVALID_CREDENTIALS));
    }

    let token = state.tokens.create_token(user.id)?;
    tracing::info!(user_id = %user.id, "User logged in: {}", user.email);

    Ok((
        [(SET_COOKIE, session_cookie(&token, state.secure_cookies()))],
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

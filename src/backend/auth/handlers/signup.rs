/**
 * Signup Handler
 *
 * This module implements the user registration handler for POST /api/auth/signup.
 *
 * # Registration Process
 *
 * 1. Validate required fields, password length and email shape
 * 2. Check if user already exists
 * 3. Hash password using bcrypt
 * 4. Create user in database
 * 5. Generate JWT token and set the session cookie
 * 6. Queue the welcome email
 * 7. Return the profile and token
 */

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Json},
};
use bcrypt::hash;

use crate::backend::auth::sessions::session_cookie;
use crate::backend::auth::users::{create_user, get_user_by_email, is_unique_violation, NewUser};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::auth::{AuthResponse, SignupRequest};

fn email_taken(email: &str) -> BackendError {
    BackendError::bad_request(format!("User with email {} already exists", email))
}

/// Sign up handler
///
/// # Errors
///
/// * `400 Bad Request` - Validation failure or email already registered
/// * `503 Service Unavailable` - If database is not configured
/// * `500 Internal Server Error` - If hashing, storage or token generation fails
///
/// # Example Request
///
/// ```http
/// POST /api/auth/signup HTTP/1.1
/// Content-Type: application/json
///
/// { "fullName": "Ada Lovelace", "email": "ada@example.com", "password": "secret1" }
/// ```
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BackendError> {
    let Json(request) = payload?;
    request.validate()?;

    let pool = state.pool()?;
    let email = request.email.trim().to_string();
    tracing::info!("Signup request for: {}", email);

    if get_user_by_email(pool, &email).await?.is_some() {
        tracing::warn!("User already exists: {}", email);
        return Err(email_taken(&email));
    }

    let password_hash = hash(&request.password, state.config.bcrypt_cost)?;

    let user = create_user(
        pool,
        NewUser {
            full_name: request.full_name.trim().to_string(),
            email: email.clone(),
            password_hash,
            profile_pic: request.profile_pic.clone(),
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            email_taken(&email)
        } else {
            BackendError::from(e)
        }
    })?;

    let token = state.tokens.create_token(user.id)?;
    tracing::info!(user_id = %user.id, "User created: {}", user.email);

    if let Some(mailer) = &state.mailer {
        mailer.spawn_welcome(user.email.clone(), user.full_name.clone());
    }

    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, session_cookie(&token, state.secure_cookies()))],
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Json},
};

use crate::backend::auth::sessions::clear_session_cookie;
use crate::backend::server::state::AppState;
use crate::shared::StatusMessage;

/// POST /api/auth/logout
///
/// Clears the session cookie. Tokens are stateless, so a bearer token stays
/// valid until it expires.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(SET_COOKIE, clear_session_cookie(state.secure_cookies()))],
        Json(StatusMessage::new("Logged out successfully")),
    )
}

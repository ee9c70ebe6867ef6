/**
 * Profile Handlers
 *
 * - `GET /api/auth/check` returns the authenticated user
 * - `PUT /api/auth/update-profile` changes the name and/or avatar
 */

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};

use crate::backend::auth::users::update_profile as store_profile;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::auth::UpdateProfileRequest;
use crate::shared::UserProfile;

/// Current user handler
pub async fn check_auth(AuthUser(user): AuthUser) -> Json<UserProfile> {
    Json(user.into())
}

/// Update profile handler
///
/// # Errors
///
/// * `400 Bad Request` - Nothing to change, or the avatar is not an image data URI
/// * `404 Not Found` - The user was deleted after authentication
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<UserProfile>, BackendError> {
    let Json(request) = payload?;
    let request = request.normalized()?;
    let pool = state.pool()?;

    let updated = store_profile(
        pool,
        user.id,
        request.full_name.as_deref(),
        request.profile_pic.as_deref(),
    )
    .await?
    .ok_or_else(|| BackendError::not_found("User not found"))?;

    tracing::info!(user_id = %updated.id, "Profile updated");
    Ok(Json(updated.into()))
}

/**
 * API Route Handlers
 *
 * # Routes
 *
 * ## Authentication
 * - `POST /api/auth/signup` - User registration
 * - `POST /api/auth/login` - User login
 * - `POST /api/auth/logout` - Clear the session cookie
 * - `PUT  /api/auth/update-profile` - Change name or avatar (authenticated)
 * - `GET  /api/auth/check` - Current user (authenticated)
 *
 * ## Messages (all authenticated)
 * - `GET  /api/messages/contacts`
 * - `GET  /api/messages/chats`
 * - `GET  /api/messages/{peer_id}`
 * - `POST /api/messages/send/{peer_id}`
 */

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use crate::backend::auth::{check_auth, login, logout, signup, update_profile};
use crate::backend::messaging::{get_chat_partners, get_contacts, get_messages, send_message};
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// Routes are relative; the caller nests them under `/api`.
pub fn configure_api_routes(app_state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout));

    let protected = Router::new()
        .route("/auth/check", get(check_auth))
        .route("/auth/update-profile", put(update_profile))
        .route("/messages/contacts", get(get_contacts))
        .route("/messages/chats", get(get_chat_partners))
        .route("/messages/send/{peer_id}", post(send_message))
        .route("/messages/{peer_id}", get(get_messages))
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware));

    public.merge(protected)
}

/**
 * Messaging HTTP Handlers
 *
 * All routes require authentication.
 *
 * - `GET  /api/messages/contacts`        - Every other user, by name
 * - `GET  /api/messages/chats`           - Users with a shared conversation
 * - `GET  /api/messages/{peerId}`        - Conversation with a peer, oldest first
 * - `POST /api/messages/send/{peerId}`   - Send a message to a peer
 */

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::backend::auth::users::{get_user_by_id, list_users_except};
use crate::backend::error::BackendError;
use crate::backend::messaging::db::{get_chat_partners as load_partners, get_conversation, insert_message};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::{Message, SendMessageRequest, UserProfile};

fn parse_peer_id(raw: &str) -> Result<Uuid, BackendError> {
    Uuid::parse_str(raw.trim()).map_err(|_| BackendError::bad_request("Invalid user id"))
}

/// Get contacts handler
pub async fn get_contacts(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<UserProfile>>, BackendError> {
    let pool = state.pool()?;
    let contacts = list_users_except(pool, user.id).await?;
    Ok(Json(contacts.into_iter().map(UserProfile::from).collect()))
}

/// Get chat partners handler
pub async fn get_chat_partners(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<UserProfile>>, BackendError> {
    let pool = state.pool()?;
    let partners = load_partners(pool, user.id).await?;
    Ok(Json(partners.into_iter().map(UserProfile::from).collect()))
}

/// Get messages handler
///
/// Returns an empty list for a peer without shared messages, including an
/// unknown one.
pub async fn get_messages(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(peer_id): Path<String>,
) -> Result<Json<Vec<Message>>, BackendError> {
    let peer_id = parse_peer_id(&peer_id)?;
    let pool = state.pool()?;
    let messages = get_conversation(pool, user.id, peer_id).await?;
    tracing::debug!(user_id = %user.id, %peer_id, count = messages.len(), "Loaded conversation");
    Ok(Json(messages))
}

/// Send message handler
///
/// # Errors
///
/// * `400 Bad Request` - Empty message, bad image, or sending to yourself
/// * `404 Not Found` - The receiver does not exist
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(peer_id): Path<String>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Message>), BackendError> {
    let peer_id = parse_peer_id(&peer_id)?;
    let Json(request) = payload?;
    let request = request.normalized()?;

    if peer_id == user.id {
        return Err(BackendError::bad_request("Cannot send messages to yourself."));
    }

    let pool = state.pool()?;
    if get_user_by_id(pool, peer_id).await?.is_none() {
        return Err(BackendError::not_found("Receiver not found."));
    }

    let message = insert_message(pool, user.id, peer_id, &request).await?;
    tracing::info!(
        message_id = %message.id,
        sender_id = %user.id,
        receiver_id = %peer_id,
        has_image = message.image.is_some(),
        "Message stored"
    );

    Ok((StatusCode::CREATED, Json(message)))
}

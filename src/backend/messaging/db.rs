/**
 * Messaging Database Operations
 *
 * Persistence for direct messages. Conversations are always read oldest
 * first; rows created in the same instant keep insertion order.
 */

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::auth::users::User;
use crate::shared::{Message, SendMessageRequest};

/// Store a new message
///
/// `request` must already be normalized.
pub async fn insert_message(
    pool: &SqlitePool,
    sender_id: Uuid,
    receiver_id: Uuid,
    request: &SendMessageRequest,
) -> Result<Message, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (id, sender_id, receiver_id, text, image, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, sender_id, receiver_id, text, image, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(sender_id)
    .bind(receiver_id)
    .bind(&request.text)
    .bind(&request.image)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

/// Every message exchanged between `a` and `b`, oldest first
pub async fn get_conversation(
    pool: &SqlitePool,
    a: Uuid,
    b: Uuid,
) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"
        SELECT id, sender_id, receiver_id, text, image, created_at
        FROM messages
        WHERE (sender_id = ? AND receiver_id = ?)
           OR (sender_id = ? AND receiver_id = ?)
        ORDER BY created_at ASC, rowid ASC
        "#,
    )
    .bind(a)
    .bind(b)
    .bind(b)
    .bind(a)
    .fetch_all(pool)
    .await
}

/// Users who have exchanged at least one message with `user_id`
pub async fn get_chat_partners(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, full_name, email, password_hash, profile_pic, created_at, updated_at
        FROM users
        WHERE id != ?
          AND id IN (
              SELECT receiver_id FROM messages WHERE sender_id = ?
              UNION
              SELECT sender_id FROM messages WHERE receiver_id = ?
          )
        ORDER BY full_name COLLATE NOCASE ASC
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/**
 * User Model and Database Operations
 *
 * This module handles user data and database operations.
 */

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::shared::UserProfile;

/// User struct representing a user in the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    pub full_name: String,
    /// Unique, stored lowercase
    pub email: String,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    /// Avatar as an image data URI
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Public view of the user, without the password hash
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            profile_pic: self.profile_pic.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            profile_pic: user.profile_pic,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Fields of a user about to be inserted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub profile_pic: Option<String>,
}

/// Canonical form of an email address used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Create a new user
///
/// # Returns
/// Created user, or a database error (a unique violation when the email is taken)
pub async fn create_user(pool: &SqlitePool, new_user: NewUser) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, full_name, email, password_hash, profile_pic, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id, full_name, email, password_hash, profile_pic, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&new_user.full_name)
    .bind(normalize_email(&new_user.email))
    .bind(&new_user.password_hash)
    .bind(&new_user.profile_pic)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
}

/// Get user by email
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, full_name, email, password_hash, profile_pic, created_at, updated_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(normalize_email(email))
    .fetch_optional(pool)
    .await
}

/// Get user by ID
pub async fn get_user_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, full_name, email, password_hash, profile_pic, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Update the display name and/or avatar
///
/// Fields passed as `None` keep their stored value.
pub async fn update_profile(
    pool: &SqlitePool,
    id: Uuid,
    full_name: Option<&str>,
    profile_pic: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET full_name = COALESCE(?, full_name),
            profile_pic = COALESCE(?, profile_pic),
            updated_at = ?
        WHERE id = ?
        RETURNING id, full_name, email, password_hash, profile_pic, created_at, updated_at
        "#,
    )
    .bind(full_name)
    .bind(profile_pic)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Every user except `id`, ordered by name
pub async fn list_users_except(pool: &SqlitePool, id: Uuid) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, full_name, email, password_hash, profile_pic, created_at, updated_at
        FROM users
        WHERE id != ?
        ORDER BY full_name COLLATE NOCASE ASC
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await
}

/// Whether an insert failed because the email is already registered
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.is_unique_violation(),
        _ => false,
    }
}

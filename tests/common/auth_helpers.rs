//! Authentication test helpers
//!
//! Create users straight in the database and mint tokens for them, so API
//! tests can skip the signup round trip when it is not under test.

use uuid::Uuid;

use parley::backend::auth::users::{create_user, NewUser};
use parley::backend::AppState;

/// Test user credentials
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub token: String,
}

/// Insert a user and issue a token for it
pub async fn create_test_user(state: &AppState, full_name: &str, email: &str, password: &str) -> TestUser {
    let password_hash = bcrypt::hash(password, 4).expect("Failed to hash password");
    let pool = state.db_pool.as_ref().expect("test database");
    let user = create_user(
        pool,
        NewUser {
            full_name: full_name.to_string(),
            email: email.to_string(),
            password_hash,
            profile_pic: None,
        },
    )
    .await
    .expect("Failed to create test user");
    let token = state
        .tokens
        .create_token(user.id)
        .expect("Failed to create test token");

    TestUser {
        id: user.id,
        full_name: user.full_name,
        email: user.email,
        password: password.to_string(),
        token,
    }
}

/// A user with a unique email
pub async fn create_unique_test_user(state: &AppState, full_name: &str) -> TestUser {
    let email = format!("user_{}@example.com", Uuid::new_v4().simple());
    create_test_user(state, full_name, &email, "password123").await
}

/// Authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}

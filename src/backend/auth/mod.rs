//! Authentication Module
//!
//! This module handles user authentication, registration, and session management.
//!
//! # Architecture
//!
//! - **`users`** - User data model and database operations
//! - **`sessions`** - JWT token generation, validation and the session cookie
//! - **`handlers`** - HTTP handlers for authentication endpoints
//!
//! # Authentication Flow
//!
//! 1. **Signup**: name, email and password → user created → token returned and set as cookie
//! 2. **Login**: email and password → credentials verified → token returned and set as cookie
//! 3. **Check**: token (header or cookie) → verified → profile returned
//! 4. **Logout**: cookie cleared
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - JWT tokens are used for stateless authentication
//! - Tokens expire after 7 days
//! - Unknown email and wrong password return the same error

/// User data model and database operations
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::{check_auth, login, logout, signup, update_profile};
pub use sessions::TokenKeys;
pub use users::User;

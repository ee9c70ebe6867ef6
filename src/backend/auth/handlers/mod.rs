//! Authentication Handlers Module
//!
//! This module contains all HTTP handlers for authentication endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── signup.rs   - User registration handler
//! ├── login.rs    - User authentication handler
//! ├── logout.rs   - Session cookie removal
//! └── profile.rs  - Current user and profile update handlers
//! ```
//!
//! # Handlers
//!
//! - **`signup`** - POST /api/auth/signup
//! - **`login`** - POST /api/auth/login
//! - **`logout`** - POST /api/auth/logout
//! - **`check_auth`** - GET /api/auth/check (authenticated)
//! - **`update_profile`** - PUT /api/auth/update-profile (authenticated)
//!
//! Request and response bodies live in [`crate::shared::auth`].

/// Signup handler
pub mod signup;

/// Login handler
pub mod login;

/// Logout handler
pub mod logout;

/// Current user and profile handlers
pub mod profile;

pub use login::login;
pub use logout::logout;
pub use profile::{check_auth, update_profile};
pub use signup::signup;

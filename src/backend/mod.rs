//! Backend Module
//!
//! This module contains all server-side code for Parley: an Axum HTTP server
//! exposing the authentication and messaging REST API over SQLite.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - Authentication, JWT tokens, user management
//! - **`messaging`** - Direct message storage and handlers
//! - **`middleware`** - Request authentication
//! - **`notify`** - Welcome email delivery
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── messaging/      - Messages
//! ├── middleware/     - Request middleware
//! ├── notify/         - Email notifications
//! └── error/          - Error types
//! ```
//!
//! # Error Handling
//!
//! Handlers return `Result<_, BackendError>`. Every error renders as
//! `{"message": "..."}` with the matching status code; internal failures are
//! logged and reported with a generic message.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Direct messages
pub mod messaging;

/// Email notifications
pub mod notify;

pub use error::BackendError;
pub use routes::create_router;
pub use server::{create_app, AppState, ServerConfig};

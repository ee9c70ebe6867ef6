//! Parley - Main Library
//!
//! Parley is a small one-to-one messaging system: an authenticated REST
//! backend on axum and SQLite, and a client library that keeps a
//! conversation in sync by polling and delivers messages with bounded
//! exponential-backoff retry.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types and validation used by both sides
//!   - Messages, drafts, user profiles, auth payloads
//!   - Image data URIs
//!   - Client configuration and shared errors
//!
//! - **`client`** - REST client and conversation controllers
//!   - Session handling and persistence
//!   - Polling and send/retry controllers over an observable store
//!   - The `parley` command-line binary
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum router, auth middleware, JWT sessions
//!   - SQLite persistence through sqlx
//!   - Welcome mail over SMTP
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Builds the backend and the `parley-server` binary
//!
//! # Usage
//!
//! ## Server-Side
//!
//! ```rust,no_run
//! # #[cfg(feature = "ssr")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use parley::backend::{create_app, ServerConfig};
//!
//! let app = create_app(ServerConfig::from_env()?).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Client
//!
//! See [`client`] for a full example of logging in and opening a conversation.
//!
//! # Thread Safety
//!
//! - **Server**: state is shared through `AppState`, a cheap `Clone` of pooled handles
//! - **Client**: conversation state lives behind a tokio `RwLock` in `ChatStore`;
//!   polling and sending run as separate tokio tasks

/// Shared types and data structures
pub mod shared;

/// REST client and conversation controllers
pub mod client;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

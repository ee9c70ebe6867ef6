//! Client Module
//!
//! Talks to the Parley REST API and keeps a local view of one conversation
//! in sync with the server.
//!
//! # Architecture
//!
//! - **`config`** - Server URL, poll interval, timeouts and retry knobs
//! - **`session`** - The logged-in session and its on-disk store
//! - **`http`** - reqwest transport with bearer auth and error mapping
//! - **`auth`** - Signup, login, logout, profile calls
//! - **`messages`** - The [`MessageApi`] seam and its HTTP implementation
//! - **`state`** - Observable conversation state
//! - **`polling`** - Background re-fetch of the open conversation
//! - **`retry`** / **`sender`** - Sends with bounded exponential backoff
//! - **`chat`** - Wires the above to the selected peer
//! - **`main`** - The `parley` command-line binary
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use parley::client::{ChatController, ChatStore, Config, HttpClient, SessionContext};
//! use parley::shared::MessageDraft;
//!
//! # async fn example(peer: uuid::Uuid) -> Result<(), parley::client::ClientError> {
//! let config = Config::load()?;
//! let client = HttpClient::new(&config, SessionContext::new())?;
//! client.login("ada@example.com", "secret1").await?;
//!
//! let chat = ChatController::new(Arc::new(client), ChatStore::new(), config.app());
//! chat.select_peer(Some(peer)).await;
//! chat.send(&MessageDraft::text("hi")).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod http;
pub mod messages;
pub mod polling;
pub mod retry;
pub mod sender;
pub mod session;
pub mod state;

pub use chat::ChatController;
pub use config::Config;
pub use error::ClientError;
pub use http::HttpClient;
pub use messages::MessageApi;
pub use polling::{PollHandle, PollState, PollingController};
pub use retry::RetryPolicy;
pub use sender::SendController;
pub use session::{Session, SessionContext, SessionStore};
pub use state::{ChatAction, ChatState, ChatStore, FetchOutcome, PendingSend};

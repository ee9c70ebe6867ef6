//! Messaging Module
//!
//! Direct messages between two users.
//!
//! - **`db`** - Message persistence and conversation queries
//! - **`handlers`** - HTTP handlers for the `/api/messages` routes

pub mod db;
pub mod handlers;

pub use handlers::{get_chat_partners, get_contacts, get_messages, send_message};

//! Messaging Module
//!
//! This module contains the data structures for one-to-one messaging:
//!
//! - `Message` - A message between two users
//! - `SendMessageRequest` - Wire body for sending a message
//! - `MessageDraft` - A message being composed on the client
//! - `ChatPartner` - A contact with shared history
//!
//! # Usage
//!
//! ```rust
//! use parley::shared::messaging::{Message, MessageDraft};
//! ```

pub mod contact;
pub mod message;

pub use contact::{sort_by_name, sort_by_recent_activity, ChatPartner};
pub use message::{Message, MessageDraft, SendMessageRequest};

//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the client and backend. These types define the JSON bodies exchanged over
//! the REST API and the validation rules both sides apply to them.
//!
//! # Overview
//!
//! The shared module provides platform-agnostic types that can be used
//! in both server and client code. All wire types use camelCase field names
//! and serialize ids as `_id`.

/// Authentication payloads and the public user profile
pub mod auth;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Embedded image payloads
pub mod media;

/// Messaging types
pub mod messaging;

/// Re-export commonly used types for convenience
pub use auth::{AuthResponse, StatusMessage, UserProfile};
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::SharedError;
pub use messaging::{Message, MessageDraft, SendMessageRequest};

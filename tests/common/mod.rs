//! Common test utilities and helpers
//!
//! Shared by every integration test crate:
//! - In-memory database fixtures and a ready router
//! - Test users and tokens
//! - wiremock helpers for the client transport
//! - Custom assertion macros

#![allow(dead_code, unused_imports, unused_macros)]

pub mod assertions;
#[cfg(feature = "ssr")]
pub mod auth_helpers;
#[cfg(feature = "ssr")]
pub mod database;
pub mod mock_server;

#[cfg(feature = "ssr")]
pub use auth_helpers::*;
#[cfg(feature = "ssr")]
pub use database::*;
pub use mock_server::*;

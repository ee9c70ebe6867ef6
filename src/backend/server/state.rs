/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` is the central state container, holding:
 * - The optional SQLite pool
 * - JWT signing keys
 * - The server configuration
 * - The optional welcome mailer
 *
 * Every field is cheap to clone: the pool and the mailer are handles, the
 * configuration sits behind an `Arc`.
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::auth::sessions::TokenKeys;
use crate::backend::error::BackendError;
use crate::backend::notify::Mailer;
use crate::backend::server::config::ServerConfig;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    ///
    /// `None` when the database could not be opened. Handlers answer 503.
    pub db_pool: Option<SqlitePool>,

    /// Keys used to sign and verify session tokens
    pub tokens: TokenKeys,

    pub config: Arc<ServerConfig>,

    /// Welcome mail sender, `None` when SMTP is not configured
    pub mailer: Option<Mailer>,
}

impl AppState {
    pub fn new(config: ServerConfig, db_pool: Option<SqlitePool>, mailer: Option<Mailer>) -> Self {
        Self {
            db_pool,
            tokens: TokenKeys::new(&config.jwt_secret),
            config: Arc::new(config),
            mailer,
        }
    }

    /// The database pool, or 503 when it is not configured
    pub fn pool(&self) -> Result<&SqlitePool, BackendError> {
        self.db_pool.as_ref().ok_or_else(|| {
            tracing::error!("Database not configured");
            BackendError::ServiceUnavailable("Database not configured".to_string())
        })
    }

    /// Whether cookies must carry the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.config.is_production()
    }
}

/// Implement FromRef for Option<SqlitePool>
///
/// This allows Axum handlers to extract the optional database pool
/// directly from `AppState`.
impl FromRef<AppState> for Option<SqlitePool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_pool_missing_is_service_unavailable() {
        let state = AppState::new(ServerConfig::default(), None, None);
        let err = state.pool().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!state.secure_cookies());
    }

    #[test]
    fn test_from_ref_shares_config() {
        let state = AppState::new(ServerConfig::default(), None, None);
        let config: Arc<ServerConfig> = FromRef::from_ref(&state);
        assert!(Arc::ptr_eq(&config, &state.config));
    }
}

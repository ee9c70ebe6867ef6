/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including state creation, database loading, and route configuration.
 *
 * # Initialization Process
 *
 * 1. Open the database and run migrations
 * 2. Build the welcome mailer if SMTP is configured
 * 3. Create the application state
 * 4. Create and configure the router
 */

use axum::Router;

use crate::backend::notify::Mailer;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
///
/// # Error Handling
///
/// The function is designed to be resilient:
/// - Missing database: server starts, store-backed routes answer 503
/// - Bad SMTP settings: server starts without welcome mail
pub async fn create_app(config: ServerConfig) -> Router<()> {
    tracing::info!("Initializing Parley backend server");

    let db_pool = load_database(&config.database_url).await;
    let mailer = build_mailer(&config);

    let app_state = AppState::new(config, db_pool, mailer);
    let app = create_router(app_state);

    tracing::info!("Router configured");
    app
}

fn build_mailer(config: &ServerConfig) -> Option<Mailer> {
    let smtp = match &config.smtp {
        Some(smtp) => smtp,
        None => {
            tracing::info!("SMTP_HOST not set. Welcome emails are disabled.");
            return None;
        }
    };

    match Mailer::from_config(smtp, config.client_url_or_default()) {
        Ok(mailer) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "Welcome mailer configured");
            Some(mailer)
        }
        Err(e) => {
            tracing::error!("Failed to configure mailer: {}", e);
            None
        }
    }
}

/**
 * Server Configuration
 *
 * This module handles loading and validation of server configuration and
 * the SQLite connection pool.
 *
 * # Configuration Sources
 *
 * Configuration is loaded from environment variables (optionally seeded from
 * a `.env` file by the binary), with defaults for local development.
 *
 * | Variable        | Default                        |
 * |-----------------|--------------------------------|
 * | `PORT`          | `3000`                         |
 * | `DATABASE_URL`  | `sqlite://parley.db?mode=rwc`  |
 * | `JWT_SECRET`    | dev secret (development only)  |
 * | `APP_ENV`       | `development`                  |
 * | `CLIENT_URL`    | unset                          |
 * | `BCRYPT_COST`   | `bcrypt::DEFAULT_COST`         |
 * | `SMTP_HOST`     | unset (welcome mail disabled)  |
 *
 * # Error Handling
 *
 * Invalid values fail startup. A store that cannot be reached is logged and
 * the server continues without it; handlers then answer 503.
 */

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::shared::ConfigError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://parley.db?mode=rwc";
const DEV_JWT_SECRET: &str = "parley-development-secret";

/// Origins allowed by CORS in addition to `CLIENT_URL`
pub const DEV_ORIGINS: [&str; 3] = [
    "http://localhost:5173",
    "http://localhost:5174",
    "http://localhost:3000",
];

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }
}

/// SMTP relay used for welcome mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender mailbox, e.g. `Parley <noreply@example.com>`
    pub from: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub environment: Environment,
    pub client_url: Option<String>,
    pub bcrypt_cost: u32,
    pub smtp: Option<SmtpConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            environment: Environment::Development,
            client_url: None,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            smtp: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = get("APP_ENV")
            .map(|value| Environment::parse(&value))
            .unwrap_or(Environment::Development);

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                field: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None if environment == Environment::Production => {
                return Err(ConfigError::MissingValue("JWT_SECRET"));
            }
            None => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let bcrypt_cost = match get("BCRYPT_COST") {
            Some(raw) => {
                let cost = raw.trim().parse::<u32>().map_err(|e| ConfigError::InvalidValue {
                    field: "BCRYPT_COST",
                    reason: e.to_string(),
                })?;
                if !(4..=31).contains(&cost) {
                    return Err(ConfigError::InvalidValue {
                        field: "BCRYPT_COST",
                        reason: "must be between 4 and 31".to_string(),
                    });
                }
                cost
            }
            None => bcrypt::DEFAULT_COST,
        };

        let smtp = match get("SMTP_HOST") {
            Some(host) => {
                let port = match get("SMTP_PORT") {
                    Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                        ConfigError::InvalidValue {
                            field: "SMTP_PORT",
                            reason: e.to_string(),
                        }
                    })?,
                    None => 25,
                };
                Some(SmtpConfig {
                    host,
                    port,
                    username: get("SMTP_USERNAME"),
                    password: get("SMTP_PASSWORD"),
                    from: get("MAIL_FROM")
                        .unwrap_or_else(|| "Parley <noreply@localhost>".to_string()),
                })
            }
            None => None,
        };

        Ok(Self {
            port,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            environment,
            client_url: get("CLIENT_URL"),
            bcrypt_cost,
            smtp,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Origins accepted by the CORS layer
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = DEV_ORIGINS.iter().map(|o| o.to_string()).collect();
        if let Some(client_url) = &self.client_url {
            let client_url = client_url.trim_end_matches('/').to_string();
            if !origins.contains(&client_url) {
                origins.push(client_url);
            }
        }
        origins
    }

    /// Base URL included in outgoing mail
    pub fn client_url_or_default(&self) -> String {
        self.client_url
            .clone()
            .unwrap_or_else(|| DEV_ORIGINS[0].to_string())
    }
}

/// Load and initialize the database connection pool
///
/// This function:
/// 1. Connects to `database_url`
/// 2. Runs the embedded migrations
///
/// # Returns
///
/// - `Some(SqlitePool)` if the database is ready
/// - `None` if the connection or the migrations fail
pub async fn load_database(database_url: &str) -> Option<SqlitePool> {
    tracing::info!("Connecting to database...");

    let pool = match SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Database features will be disabled.");
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    if let Err(e) = sqlx::migrate!().run(&pool).await {
        tracing::error!("Failed to run database migrations: {}", e);
        return None;
    }

    tracing::info!("Database ready");
    Some(pool)
}

/// Private in-memory database with migrations applied
///
/// A single connection keeps every query on the same memory store.
pub async fn memory_database() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;
    Ok(pool)
}

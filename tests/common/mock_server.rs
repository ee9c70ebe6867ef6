//! Mock server helpers
//!
//! Stand up a wiremock server in place of the Parley API and point a real
//! [`HttpClient`] at it.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::MockServer;

use parley::client::{Config, HttpClient, Session, SessionContext};
use parley::shared::{AppConfig, UserProfile};

pub const TEST_TOKEN: &str = "test-token";

/// A mock API plus a client configured against it
pub struct MockApi {
    pub server: MockServer,
    pub client: HttpClient,
}

impl MockApi {
    /// Client without a session
    pub async fn anonymous() -> Self {
        Self::start(SessionContext::new()).await
    }

    /// Client logged in as `me` with [`TEST_TOKEN`]
    pub async fn logged_in(me: &UserProfile) -> Self {
        Self::start(SessionContext::with_session(Session {
            token: TEST_TOKEN.to_string(),
            user: me.clone(),
        }))
        .await
    }

    async fn start(session: SessionContext) -> Self {
        let server = MockServer::start().await;
        let config = mock_config(&server.uri());
        let client = HttpClient::new(&config, session).expect("client builds");
        Self { server, client }
    }
}

/// Client config for `server_url` with a short timeout
pub fn mock_config(server_url: &str) -> Config {
    Config::with_builder(
        AppConfig::builder()
            .server_url(server_url)
            .request_timeout(Duration::from_millis(500)),
    )
    .expect("valid config")
}

pub fn fixed_time(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, minute, 0).unwrap()
}

pub fn profile(name: &str) -> UserProfile {
    UserProfile {
        id: Uuid::new_v4(),
        full_name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        profile_pic: None,
        created_at: fixed_time(0),
        updated_at: fixed_time(0),
    }
}

/// Wire form of a message as the server returns it
pub fn message_json(id: Uuid, from: Uuid, to: Uuid, text: &str, minute: u32) -> Value {
    json!({
        "_id": id,
        "senderId": from,
        "receiverId": to,
        "text": text,
        "createdAt": fixed_time(minute),
    })
}

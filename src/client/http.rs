//! Transport client
//!
//! Thin wrapper over `reqwest` that prefixes the API base URL, attaches the
//! bearer token from the [`SessionContext`] and turns every response into
//! `Result<T, ClientError>`:
//!
//! - no response → [`ClientError::Network`] (timeouts flagged)
//! - non-2xx → [`ClientError::Http`] with the server's `message`
//! - 2xx with an unexpected body → [`ClientError::Decode`]

use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};

use crate::client::config::Config;
use crate::client::error::ClientError;
use crate::client::session::SessionContext;

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    api_base: String,
    session: SessionContext,
}

impl HttpClient {
    pub fn new(config: &Config, session: SessionContext) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.app().api_base(),
            session,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.execute(self.client.get(self.url(path))).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.client.post(self.url(path)).json(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.client.put(self.url(path)).json(body)).await
    }

    /// POST without a body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.execute(self.client.post(self.url(path))).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            tracing::debug!("request failed without response: {}", e);
            ClientError::from(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body: Option<serde_json::Value> = serde_json::from_slice(&bytes).ok();
            let message = body
                .as_ref()
                .and_then(|b| b.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                });
            tracing::debug!(status = status.as_u16(), "request rejected: {}", message);
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
                body,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

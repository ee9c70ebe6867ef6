//! Authentication calls
//!
//! Signup and login store the issued session in the client's
//! [`SessionContext`](crate::client::session::SessionContext); logout clears it
//! even when the server cannot be reached.

use crate::client::error::ClientError;
use crate::client::http::HttpClient;
use crate::client::session::Session;
use crate::shared::auth::{AuthResponse, LoginRequest, SignupRequest, UpdateProfileRequest};
use crate::shared::{StatusMessage, UserProfile};

impl HttpClient {
    pub async fn signup(&self, request: &SignupRequest) -> Result<Session, ClientError> {
        request.validate()?;
        let response: AuthResponse = self.post("/auth/signup", request).await?;
        Ok(self.start_session(response))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self.post("/auth/login", &request).await?;
        Ok(self.start_session(response))
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let result: Result<StatusMessage, ClientError> = self.post_empty("/auth/logout").await;
        self.session().clear();
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::warn!("logout request failed, session cleared locally: {}", e);
                Err(e)
            }
        }
    }

    /// Current user according to the server
    ///
    /// A session the server rejects with 401 is cleared.
    pub async fn check_auth(&self) -> Result<UserProfile, ClientError> {
        if !self.session().is_authenticated() {
            return Err(ClientError::NotAuthenticated);
        }
        let user: UserProfile = match self.get("/auth/check").await {
            Ok(user) => user,
            Err(e) => {
                if e.is_unauthorized() {
                    tracing::info!("Session rejected by server, clearing it");
                    self.session().clear();
                }
                return Err(e);
            }
        };
        self.session().update_user(user.clone());
        Ok(user)
    }

    pub async fn update_profile(&self, request: UpdateProfileRequest) -> Result<UserProfile, ClientError> {
        if !self.session().is_authenticated() {
            return Err(ClientError::NotAuthenticated);
        }
        let request = request.normalized()?;
        let user: UserProfile = self.put("/auth/update-profile", &request).await?;
        self.session().update_user(user.clone());
        Ok(user)
    }

    fn start_session(&self, response: AuthResponse) -> Session {
        let session = Session {
            token: response.token,
            user: response.user,
        };
        self.session().set(session.clone());
        tracing::info!(user_id = %session.user.id, "Session started");
        session
    }
}

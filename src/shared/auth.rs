//! Authentication payloads
//!
//! Request and response bodies for the `/auth` endpoints, shared by the
//! backend handlers and the client.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::media::parse_image_data_uri;

/// Minimum password length accepted at signup
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sign up request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Optional avatar as an image data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
}

impl SignupRequest {
    /// Check required fields, password length, email shape and avatar payload.
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.full_name.trim().is_empty() || self.email.trim().is_empty() || self.password.is_empty() {
            return Err(SharedError::validation("signup", "Please fill in all the fields"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(SharedError::validation(
                "password",
                format!("Password should be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        if !is_valid_email(self.email.trim()) {
            return Err(SharedError::validation("email", "Invalid email format"));
        }
        if let Some(pic) = &self.profile_pic {
            parse_image_data_uri(pic)?;
        }
        Ok(())
    }
}

/// Login request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `PUT /auth/update-profile`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
}

impl UpdateProfileRequest {
    /// Trim the name, drop empty fields and require at least one change.
    pub fn normalized(self) -> Result<Self, SharedError> {
        let full_name = self
            .full_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let profile_pic = self.profile_pic.filter(|p| !p.trim().is_empty());

        if full_name.is_none() && profile_pic.is_none() {
            return Err(SharedError::validation(
                "profilePic",
                "Profile Picture is Required.",
            ));
        }
        if let Some(pic) = &profile_pic {
            parse_image_data_uri(pic)?;
        }
        Ok(Self {
            full_name,
            profile_pic,
        })
    }
}

/// Returned by signup and login: the user plus a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: UserProfile,
    pub token: String,
}

/// Plain `{ "message": ... }` body used for errors and acknowledgements
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusMessage {
    pub message: String,
}

impl StatusMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

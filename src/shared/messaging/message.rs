//! Chat Message Data Structure
//!
//! Represents a message between two users and the payloads used to create one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::media::{parse_image_data_uri, ImageAttachment};

/// A message as stored by the server. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ssr", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Server-assigned message ID
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// User who sent the message
    pub sender_id: Uuid,
    /// User the message was sent to
    pub receiver_id: Uuid,
    /// Trimmed, non-empty text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Image as a data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// When the server accepted the message
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Whether this message belongs to the conversation between `a` and `b`
    pub fn is_between(&self, a: Uuid, b: Uuid) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }

    /// The other participant, seen from `me`
    pub fn peer_of(&self, me: Uuid) -> Uuid {
        if self.sender_id == me {
            self.receiver_id
        } else {
            self.sender_id
        }
    }

    /// One-line preview for conversation lists
    pub fn preview(&self, max_len: usize) -> String {
        let text = match (&self.text, &self.image) {
            (Some(text), Some(_)) => format!("📷 {}", text),
            (None, Some(_)) => "📷 Photo".to_string(),
            (Some(text), None) => text.clone(),
            (None, None) => String::new(),
        };
        if text.chars().count() <= max_len {
            text
        } else {
            let mut preview: String = text.chars().take(max_len.saturating_sub(3)).collect();
            preview.push_str("...");
            preview
        }
    }
}

/// Body of `POST /messages/send/{peerId}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl SendMessageRequest {
    /// Trim the text, drop empty fields and check that something is left.
    ///
    /// An image, when present, must be a valid image data URI.
    pub fn normalized(self) -> Result<Self, SharedError> {
        let text = self
            .text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let image = self.image.filter(|i| !i.trim().is_empty());

        if text.is_none() && image.is_none() {
            return Err(SharedError::validation(
                "message",
                "Message must contain either text or image",
            ));
        }
        if let Some(image) = &image {
            parse_image_data_uri(image)?;
        }

        Ok(Self { text, image })
    }
}

/// Outgoing message as composed on the client, before encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageDraft {
    pub text: Option<String>,
    pub image: Option<ImageAttachment>,
}

impl MessageDraft {
    /// Text-only draft
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image: None,
        }
    }

    /// Image-only draft
    pub fn image(image: ImageAttachment) -> Self {
        Self {
            text: None,
            image: Some(image),
        }
    }

    /// Attach a caption
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Whether the draft carries nothing worth sending
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.text.as_deref().map_or(true, |t| t.trim().is_empty())
    }

    /// Encode into the wire request, embedding the image as a data URI.
    ///
    /// Fails without touching the network when neither text nor image is present.
    pub fn to_request(&self) -> Result<SendMessageRequest, SharedError> {
        if self.is_empty() {
            return Err(SharedError::validation(
                "message",
                "Message must contain either text or image",
            ));
        }
        SendMessageRequest {
            text: self.text.clone(),
            image: self.image.as_ref().map(ImageAttachment::to_data_uri),
        }
        .normalized()
    }
}

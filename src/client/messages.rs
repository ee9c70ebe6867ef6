//! Message access functions
//!
//! [`MessageApi`] is the seam between the controllers and the transport.
//! [`HttpClient`] implements it against the REST API; tests substitute
//! scripted fakes.

use std::future::Future;

use uuid::Uuid;

use crate::client::error::ClientError;
use crate::client::http::HttpClient;
use crate::shared::messaging::sort_by_name;
use crate::shared::{Message, MessageDraft, SendMessageRequest, UserProfile};

pub trait MessageApi: Send + Sync + 'static {
    /// Conversation with `peer_id`, oldest first
    fn get_messages(
        &self,
        peer_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Message>, ClientError>> + Send;

    /// Send a wire payload; returns the message as stored by the server
    fn send_message(
        &self,
        peer_id: Uuid,
        request: SendMessageRequest,
    ) -> impl Future<Output = Result<Message, ClientError>> + Send;

    /// Every other user, by name
    fn get_contacts(&self) -> impl Future<Output = Result<Vec<UserProfile>, ClientError>> + Send;

    /// Users with a shared conversation
    fn get_chat_partners(
        &self,
    ) -> impl Future<Output = Result<Vec<UserProfile>, ClientError>> + Send;

    /// Encode a draft and send it
    ///
    /// Drafts with neither text nor image fail with
    /// [`ClientError::Validation`] before any request is made.
    fn send_draft(
        &self,
        peer_id: Uuid,
        draft: &MessageDraft,
    ) -> impl Future<Output = Result<Message, ClientError>> + Send {
        let request = draft.to_request();
        async move { self.send_message(peer_id, request?).await }
    }
}

impl MessageApi for HttpClient {
    async fn get_messages(&self, peer_id: Uuid) -> Result<Vec<Message>, ClientError> {
        self.get(&format!("/messages/{}", peer_id)).await
    }

    async fn send_message(
        &self,
        peer_id: Uuid,
        request: SendMessageRequest,
    ) -> Result<Message, ClientError> {
        let request = request.normalized()?;
        self.post(&format!("/messages/send/{}", peer_id), &request).await
    }

    async fn get_contacts(&self) -> Result<Vec<UserProfile>, ClientError> {
        let mut contacts: Vec<UserProfile> = self.get("/messages/contacts").await?;
        sort_by_name(&mut contacts);
        Ok(contacts)
    }

    async fn get_chat_partners(&self) -> Result<Vec<UserProfile>, ClientError> {
        self.get("/messages/chats").await
    }
}

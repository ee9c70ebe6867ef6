//! # Chat Controller
//!
//! Ties the store, the polling controller and the send controller to the
//! selected conversation. Selecting a peer stops the previous poll, cancels
//! any outstanding send and starts polling the new conversation.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use uuid::Uuid;

use crate::client::error::ClientError;
use crate::client::messages::MessageApi;
use crate::client::polling::{poll_once, PollState, PollingController};
use crate::client::retry::RetryPolicy;
use crate::client::sender::SendController;
use crate::client::state::{ChatAction, ChatStore, FetchOutcome};
use crate::shared::messaging::{sort_by_name, sort_by_recent_activity, ChatPartner};
use crate::shared::{AppConfig, Message, MessageDraft, SharedError, UserProfile};

pub struct ChatController<A> {
    api: Arc<A>,
    store: ChatStore,
    polling: PollingController<A>,
    sender: SendController<A>,
    poll_interval: Duration,
}

impl<A> Clone for ChatController<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            store: self.store.clone(),
            polling: self.polling.clone(),
            sender: self.sender.clone(),
            poll_interval: self.poll_interval,
        }
    }
}

impl<A: MessageApi> ChatController<A> {
    pub fn new(api: Arc<A>, store: ChatStore, config: &AppConfig) -> Self {
        Self {
            polling: PollingController::new(Arc::clone(&api), store.clone()),
            sender: SendController::new(
                Arc::clone(&api),
                store.clone(),
                RetryPolicy::from_config(config),
            ),
            api,
            store,
            poll_interval: config.poll_interval,
        }
    }

    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn sender(&self) -> &SendController<A> {
        &self.sender
    }

    pub fn poll_state(&self) -> PollState {
        self.polling.state()
    }

    pub async fn set_current_user(&self, user: Option<UserProfile>) {
        self.store.dispatch(ChatAction::SetCurrentUser(user)).await;
    }

    /// Switch the conversation view to `peer_id`, or close it with `None`
    ///
    /// Re-selecting the open conversation is a no-op and keeps its send.
    pub async fn select_peer(&self, peer_id: Option<Uuid>) {
        let polled = match self.polling.state() {
            PollState::Polling { peer_id } => Some(peer_id),
            PollState::Idle => None,
        };
        if polled == peer_id && self.selected_peer().await == peer_id {
            tracing::trace!(?peer_id, "Conversation already open");
            return;
        }

        self.polling.stop_all();
        self.sender.cancel().await;

        match peer_id {
            Some(peer_id) => {
                self.store
                    .dispatch_all([
                        ChatAction::SetSelectedPeer(Some(peer_id)),
                        ChatAction::SetMessagesLoading(true),
                    ])
                    .await;
                self.polling.start(peer_id, self.poll_interval);
                tracing::info!(%peer_id, "Conversation opened");
            }
            None => {
                self.store.dispatch(ChatAction::SetSelectedPeer(None)).await;
            }
        }
    }

    /// Fetch the selected conversation once, outside the polling schedule
    pub async fn load_messages(&self) -> Result<FetchOutcome, ClientError> {
        let Some(peer_id) = self.selected_peer().await else {
            return Ok(FetchOutcome::Stale);
        };
        match poll_once(self.api.as_ref(), &self.store, peer_id).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.store
                    .dispatch_all([
                        ChatAction::SetMessagesLoading(false),
                        ChatAction::SetError(Some(e.to_string())),
                    ])
                    .await;
                Err(e)
            }
        }
    }

    /// Send `draft` to the selected peer
    pub async fn send(&self, draft: &MessageDraft) -> Result<Message, ClientError> {
        let Some(peer_id) = self.selected_peer().await else {
            return Err(SharedError::validation("peer", "No conversation selected").into());
        };
        self.sender.send_draft(peer_id, draft).await
    }

    pub async fn retry_send(&self) -> Result<Option<Message>, ClientError> {
        self.sender.retry().await
    }

    pub async fn load_contacts(&self) -> Result<Vec<UserProfile>, ClientError> {
        self.store.dispatch(ChatAction::SetContactsLoading(true)).await;
        match self.api.get_contacts().await {
            Ok(mut contacts) => {
                sort_by_name(&mut contacts);
                self.store
                    .dispatch_all([
                        ChatAction::SetContacts(contacts.clone()),
                        ChatAction::SetContactsLoading(false),
                    ])
                    .await;
                Ok(contacts)
            }
            Err(e) => Err(self.contacts_failed(e).await),
        }
    }

    /// Chat partners with their last message, most recent activity first
    pub async fn load_chat_partners(&self) -> Result<Vec<ChatPartner>, ClientError> {
        self.store.dispatch(ChatAction::SetContactsLoading(true)).await;
        let users = match self.api.get_chat_partners().await {
            Ok(users) => users,
            Err(e) => return Err(self.contacts_failed(e).await),
        };

        let conversations = join_all(users.iter().map(|user| self.api.get_messages(user.id))).await;
        let mut partners: Vec<ChatPartner> = users
            .into_iter()
            .zip(conversations)
            .map(|(user, conversation)| {
                let last_message = match conversation {
                    Ok(mut messages) => messages.pop(),
                    Err(e) => {
                        tracing::warn!(peer_id = %user.id, "Could not load last message: {}", e);
                        None
                    }
                };
                ChatPartner { user, last_message }
            })
            .collect();
        sort_by_recent_activity(&mut partners);

        self.store
            .dispatch_all([
                ChatAction::SetChatPartners(partners.clone()),
                ChatAction::SetContactsLoading(false),
            ])
            .await;
        Ok(partners)
    }

    /// Stop background work and clear the state
    pub async fn teardown(&self) {
        self.polling.stop_all();
        self.sender.cancel().await;
        self.store.dispatch(ChatAction::Reset).await;
        tracing::debug!("Chat controller torn down");
    }

    async fn selected_peer(&self) -> Option<Uuid> {
        self.store.read(|state| state.selected_peer).await
    }

    async fn contacts_failed(&self, error: ClientError) -> ClientError {
        self.store
            .dispatch_all([
                ChatAction::SetContactsLoading(false),
                ChatAction::SetError(Some(error.to_string())),
            ])
            .await;
        error
    }
}

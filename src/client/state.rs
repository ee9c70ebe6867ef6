//! Conversation state store
//!
//! [`ChatState`] holds everything a front-end renders: the current user, the
//! selected peer and its messages, contact lists, loading and error flags and
//! the pending send. It changes only through named [`ChatAction`]s.
//!
//! [`ChatStore`] shares the state between the polling task, the send task and
//! the UI. Writers take the lock for one synchronous `apply` and never across
//! an await. Every effective change bumps `revision` and is broadcast on a
//! `watch` channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use uuid::Uuid;

use crate::shared::messaging::ChatPartner;
use crate::shared::{Message, SendMessageRequest, UserProfile};

/// A send that failed terminally, kept for manual retry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub peer_id: Uuid,
    pub request: SendMessageRequest,
}

#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub current_user: Option<UserProfile>,
    pub selected_peer: Option<Uuid>,
    /// Conversation with `selected_peer`, oldest first
    pub messages: Arc<Vec<Message>>,
    pub contacts: Vec<UserProfile>,
    pub chat_partners: Vec<ChatPartner>,
    pub is_messages_loading: bool,
    pub is_contacts_loading: bool,
    /// Set while a send, including its automatic retries, is outstanding
    pub is_sending: bool,
    pub error: Option<String>,
    /// Error of the last send
    pub message_error: Option<String>,
    pub pending_send: Option<PendingSend>,
    /// Incremented on every effective change
    pub revision: u64,
    last_applied_ticket: u64,
}

#[derive(Debug, Clone)]
pub enum ChatAction {
    SetCurrentUser(Option<UserProfile>),
    /// Switch conversations; clears messages, send errors and the pending send
    SetSelectedPeer(Option<Uuid>),
    /// Replace the conversation wholesale
    SetMessages { peer_id: Uuid, messages: Vec<Message> },
    /// Append one acknowledged message, once
    AddMessage(Message),
    SetContacts(Vec<UserProfile>),
    SetChatPartners(Vec<ChatPartner>),
    SetMessagesLoading(bool),
    SetContactsLoading(bool),
    SetSending(bool),
    SetError(Option<String>),
    SetMessageError(Option<String>),
    SetPendingSend(Option<PendingSend>),
    Reset,
}

/// Result of applying a fetched conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Replaced,
    Unchanged,
    /// Older than an applied fetch, or for a peer no longer selected
    Stale,
}

/// Sequence number taken when a fetch starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl ChatState {
    /// Apply an action; returns whether anything changed
    pub fn apply(&mut self, action: ChatAction) -> bool {
        let changed = match action {
            ChatAction::SetCurrentUser(user) => replace(&mut self.current_user, user),
            ChatAction::SetSelectedPeer(peer) => {
                if self.selected_peer == peer {
                    false
                } else {
                    self.selected_peer = peer;
                    self.messages = Arc::new(Vec::new());
                    self.is_messages_loading = false;
                    self.is_sending = false;
                    self.message_error = None;
                    self.pending_send = None;
                    true
                }
            }
            ChatAction::SetMessages { peer_id, messages } => {
                if self.selected_peer != Some(peer_id) {
                    false
                } else {
                    self.messages = Arc::new(messages);
                    true
                }
            }
            ChatAction::AddMessage(message) => self.add_message(message),
            ChatAction::SetContacts(contacts) => replace(&mut self.contacts, contacts),
            ChatAction::SetChatPartners(partners) => replace(&mut self.chat_partners, partners),
            ChatAction::SetMessagesLoading(loading) => replace(&mut self.is_messages_loading, loading),
            ChatAction::SetContactsLoading(loading) => replace(&mut self.is_contacts_loading, loading),
            ChatAction::SetSending(sending) => replace(&mut self.is_sending, sending),
            ChatAction::SetError(error) => replace(&mut self.error, error),
            ChatAction::SetMessageError(error) => replace(&mut self.message_error, error),
            ChatAction::SetPendingSend(pending) => replace(&mut self.pending_send, pending),
            ChatAction::Reset => {
                let revision = self.revision;
                let last_applied_ticket = self.last_applied_ticket;
                *self = ChatState {
                    revision,
                    last_applied_ticket,
                    ..ChatState::default()
                };
                true
            }
        };

        if changed {
            self.revision += 1;
        }
        changed
    }

    fn add_message(&mut self, message: Message) -> bool {
        let Some(peer_id) = self.selected_peer else {
            return false;
        };
        if message.sender_id != peer_id && message.receiver_id != peer_id {
            tracing::debug!(message_id = %message.id, "Ignoring message for another conversation");
            return false;
        }
        if self.messages.iter().any(|m| m.id == message.id) {
            return false;
        }
        Arc::make_mut(&mut self.messages).push(message);
        true
    }

    pub fn last_message_id(&self) -> Option<Uuid> {
        self.messages.last().map(|m| m.id)
    }

    /// Whether `fetched` differs in length or last id from the current list
    pub fn differs_from(&self, fetched: &[Message]) -> bool {
        fetched.len() != self.messages.len() || fetched.last().map(|m| m.id) != self.last_message_id()
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Shared, observable [`ChatState`]
#[derive(Debug, Clone)]
pub struct ChatStore {
    state: Arc<RwLock<ChatState>>,
    changes: Arc<watch::Sender<u64>>,
    tickets: Arc<AtomicU64>,
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatStore {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(ChatState::default())),
            changes: Arc::new(changes),
            tickets: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Clone of the current state
    pub async fn snapshot(&self) -> ChatState {
        self.state.read().await.clone()
    }

    pub async fn read<R>(&self, f: impl FnOnce(&ChatState) -> R) -> R {
        f(&*self.state.read().await)
    }

    pub async fn dispatch(&self, action: ChatAction) -> bool {
        self.dispatch_all([action]).await
    }

    /// Apply several actions under one lock; observers see them together
    ///
    /// An appended message retires every fetch ticket issued so far: those
    /// requests may have been answered before the message existed.
    pub async fn dispatch_all(&self, actions: impl IntoIterator<Item = ChatAction>) -> bool {
        let mut state = self.state.write().await;
        let mut changed = false;
        for action in actions {
            let appends = matches!(action, ChatAction::AddMessage(_));
            if state.apply(action) {
                changed = true;
                if appends {
                    let issued = self.tickets.load(Ordering::SeqCst);
                    state.last_applied_ticket = state.last_applied_ticket.max(issued);
                }
            }
        }
        if changed {
            self.changes.send_replace(state.revision);
        }
        changed
    }

    /// Receiver notified with the revision after every change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    pub fn next_ticket(&self) -> FetchTicket {
        FetchTicket(self.tickets.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Apply the result of a conversation fetch started with `ticket`
    ///
    /// The list is replaced only when its length or last id differs; an
    /// identical result keeps the existing `Arc` and revision.
    pub async fn apply_fetch(
        &self,
        ticket: FetchTicket,
        peer_id: Uuid,
        messages: Vec<Message>,
    ) -> FetchOutcome {
        let mut state = self.state.write().await;
        if state.selected_peer != Some(peer_id) {
            return FetchOutcome::Stale;
        }
        if ticket.0 <= state.last_applied_ticket {
            if state.apply(ChatAction::SetMessagesLoading(false)) {
                self.changes.send_replace(state.revision);
            }
            return FetchOutcome::Stale;
        }
        state.last_applied_ticket = ticket.0;

        let mut changed = state.apply(ChatAction::SetMessagesLoading(false));
        let outcome = if state.differs_from(&messages) {
            changed |= state.apply(ChatAction::SetMessages { peer_id, messages });
            FetchOutcome::Replaced
        } else {
            FetchOutcome::Unchanged
        };

        if changed {
            self.changes.send_replace(state.revision);
        }
        outcome
    }
}

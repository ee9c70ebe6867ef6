//! # Send Controller
//!
//! Delivers outgoing messages with bounded exponential backoff.
//!
//! One send may be outstanding at a time. While it is, the store's
//! `is_sending` flag is set and further submissions fail with
//! [`ClientError::Busy`]. Transient failures are retried according to the
//! [`RetryPolicy`]; a terminal failure leaves the payload in the store as the
//! pending send, where [`SendController::retry`] picks it up.
//!
//! The retry loop runs under a [`CancellationToken`]. Once a send has been
//! cancelled it never touches the store again, even if a response was already
//! on its way.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::client::error::ClientError;
use crate::client::messages::MessageApi;
use crate::client::retry::RetryPolicy;
use crate::client::state::{ChatAction, ChatStore, PendingSend};
use crate::shared::{Message, MessageDraft, SendMessageRequest};

struct InFlightSend {
    id: u64,
    peer_id: Uuid,
    cancel: CancellationToken,
}

pub struct SendController<A> {
    api: Arc<A>,
    store: ChatStore,
    policy: RetryPolicy,
    inflight: Arc<Mutex<Option<InFlightSend>>>,
    next_id: Arc<AtomicU64>,
}

impl<A> Clone for SendController<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            store: self.store.clone(),
            policy: self.policy,
            inflight: Arc::clone(&self.inflight),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<A: MessageApi> SendController<A> {
    pub fn new(api: Arc<A>, store: ChatStore, policy: RetryPolicy) -> Self {
        Self {
            api,
            store,
            policy,
            inflight: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Encode `draft` and send it to `peer_id`
    ///
    /// An empty or malformed draft is reported in the store's message error
    /// and never reaches the network.
    pub async fn send_draft(&self, peer_id: Uuid, draft: &MessageDraft) -> Result<Message, ClientError> {
        match draft.to_request() {
            Ok(request) => self.send(peer_id, request).await,
            Err(e) => Err(self.reject(e.into()).await),
        }
    }

    /// Send `request` to `peer_id`, retrying transient failures
    ///
    /// On success the acknowledged message is appended to the conversation
    /// and any pending send is cleared.
    pub async fn send(&self, peer_id: Uuid, request: SendMessageRequest) -> Result<Message, ClientError> {
        let request = match request.normalized() {
            Ok(request) => request,
            Err(e) => return Err(self.reject(e.into()).await),
        };

        let (id, cancel) = {
            let mut inflight = self.inflight.lock().await;
            if inflight.is_some() {
                tracing::debug!(%peer_id, "Rejected overlapping send");
                return Err(ClientError::Busy);
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let cancel = CancellationToken::new();
            *inflight = Some(InFlightSend {
                id,
                peer_id,
                cancel: cancel.clone(),
            });
            self.store
                .dispatch_all([
                    ChatAction::SetSending(true),
                    ChatAction::SetMessageError(None),
                ])
                .await;
            (id, cancel)
        };

        let result = self.attempt_loop(peer_id, &request, &cancel).await;
        self.finish(id, peer_id, request, result).await
    }

    /// Re-send the pending payload, if there is one
    pub async fn retry(&self) -> Result<Option<Message>, ClientError> {
        let pending = self.store.read(|state| state.pending_send.clone()).await;
        match pending {
            Some(pending) => {
                tracing::info!(peer_id = %pending.peer_id, "Retrying pending send");
                self.send(pending.peer_id, pending.request).await.map(Some)
            }
            None => Ok(None),
        }
    }

    /// Cancel the outstanding send
    ///
    /// Returns whether there was one. The cancelled task leaves the store
    /// untouched; only the busy flag is cleared here.
    pub async fn cancel(&self) -> bool {
        let mut inflight = self.inflight.lock().await;
        let Some(current) = inflight.take() else {
            return false;
        };
        current.cancel.cancel();
        self.store.dispatch(ChatAction::SetSending(false)).await;
        tracing::debug!(peer_id = %current.peer_id, "Send cancelled");
        true
    }

    pub async fn is_busy(&self) -> bool {
        self.inflight.lock().await.is_some()
    }

    async fn attempt_loop(
        &self,
        peer_id: Uuid,
        request: &SendMessageRequest,
        cancel: &CancellationToken,
    ) -> Result<Message, ClientError> {
        let mut attempt = 0;
        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                result = self.api.send_message(peer_id, request.clone()) => result,
            };

            let error = match result {
                Ok(message) => return Ok(message),
                Err(e) => e,
            };
            if !self.policy.should_retry(attempt, &error) {
                return Err(error);
            }

            let delay = self.policy.delay_for(attempt);
            tracing::warn!(
                %peer_id,
                attempt = attempt + 1,
                ?delay,
                "Send failed, retrying: {}",
                error
            );
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
            attempt += 1;
        }
    }

    async fn finish(
        &self,
        id: u64,
        peer_id: Uuid,
        request: SendMessageRequest,
        result: Result<Message, ClientError>,
    ) -> Result<Message, ClientError> {
        let mut inflight = self.inflight.lock().await;
        if !inflight.as_ref().is_some_and(|current| current.id == id) {
            return Err(ClientError::Cancelled);
        }
        *inflight = None;

        match result {
            Ok(message) => {
                self.store
                    .dispatch_all([
                        ChatAction::AddMessage(message.clone()),
                        ChatAction::SetPendingSend(None),
                        ChatAction::SetMessageError(None),
                        ChatAction::SetSending(false),
                    ])
                    .await;
                tracing::debug!(%peer_id, message_id = %message.id, "Message delivered");
                Ok(message)
            }
            Err(ClientError::Cancelled) => {
                self.store.dispatch(ChatAction::SetSending(false)).await;
                Err(ClientError::Cancelled)
            }
            Err(e) => {
                tracing::warn!(%peer_id, "Send failed: {}", e);
                self.store
                    .dispatch_all([
                        ChatAction::SetMessageError(Some(e.to_string())),
                        ChatAction::SetPendingSend(Some(PendingSend { peer_id, request })),
                        ChatAction::SetSending(false),
                    ])
                    .await;
                Err(e)
            }
        }
    }

    async fn reject(&self, error: ClientError) -> ClientError {
        tracing::warn!("Rejected message: {}", error);
        self.store
            .dispatch(ChatAction::SetMessageError(Some(error.to_string())))
            .await;
        error
    }
}

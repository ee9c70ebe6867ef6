//! # Polling Controller
//!
//! Keeps the selected conversation fresh by re-fetching it on a fixed
//! interval. At most one polling task runs per controller; starting a new one
//! stops the previous one.
//!
//! Each fetch takes a [`FetchTicket`](crate::client::state::FetchTicket)
//! before the request goes out, so a slow response can never overwrite a
//! newer one. Failures are logged and the next tick tries again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::client::error::ClientError;
use crate::client::messages::MessageApi;
use crate::client::state::{ChatAction, ChatStore, FetchOutcome};

/// Shortest interval `start` accepts; shorter ones are raised to it
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Identifies one polling task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PollHandle {
    id: u64,
    peer_id: Uuid,
}

impl PollHandle {
    pub fn peer_id(&self) -> Uuid {
        self.peer_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling { peer_id: Uuid },
}

struct RunningPoll {
    handle: PollHandle,
    stop: CancellationToken,
    task: JoinHandle<()>,
}

pub struct PollingController<A> {
    api: Arc<A>,
    store: ChatStore,
    running: Arc<Mutex<Option<RunningPoll>>>,
    next_id: Arc<AtomicU64>,
}

impl<A> Clone for PollingController<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            store: self.store.clone(),
            running: Arc::clone(&self.running),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<A: MessageApi> PollingController<A> {
    pub fn new(api: Arc<A>, store: ChatStore) -> Self {
        Self {
            api,
            store,
            running: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start polling `peer_id`: one fetch now, then one every `interval`
    ///
    /// Must be called from within a tokio runtime. An `interval` below
    /// [`MIN_POLL_INTERVAL`] is raised to it.
    pub fn start(&self, peer_id: Uuid, interval: Duration) -> PollHandle {
        if interval < MIN_POLL_INTERVAL {
            tracing::warn!(?interval, "Poll interval too short, using {:?}", MIN_POLL_INTERVAL);
        }
        let interval = interval.max(MIN_POLL_INTERVAL);
        let handle = PollHandle {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            peer_id,
        };
        let stop = CancellationToken::new();
        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.api),
            self.store.clone(),
            peer_id,
            interval,
            stop.clone(),
        ));

        let previous = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(RunningPoll { handle, stop, task });
        if let Some(previous) = previous {
            previous.stop.cancel();
            tracing::debug!(peer_id = %previous.handle.peer_id, "Replaced polling task");
        }

        tracing::debug!(%peer_id, ?interval, "Polling started");
        handle
    }

    /// Stop the task behind `handle`
    ///
    /// Returns `false` when that task is no longer the running one.
    pub fn stop(&self, handle: PollHandle) -> bool {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        match running.as_ref() {
            Some(current) if current.handle == handle => {
                if let Some(current) = running.take() {
                    current.stop.cancel();
                    tracing::debug!(peer_id = %handle.peer_id, "Polling stopped");
                }
                true
            }
            _ => false,
        }
    }

    /// Stop whatever is running
    pub fn stop_all(&self) {
        let current = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(current) = current {
            current.stop.cancel();
            tracing::debug!(peer_id = %current.handle.peer_id, "Polling stopped");
        }
    }

    pub fn state(&self) -> PollState {
        let running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        match running.as_ref() {
            Some(current) if !current.task.is_finished() => PollState::Polling {
                peer_id: current.handle.peer_id,
            },
            _ => PollState::Idle,
        }
    }
}

/// Fetch the conversation with `peer_id` once and apply it to the store
pub async fn poll_once<A: MessageApi>(
    api: &A,
    store: &ChatStore,
    peer_id: Uuid,
) -> Result<FetchOutcome, ClientError> {
    let ticket = store.next_ticket();
    let messages = api.get_messages(peer_id).await?;
    Ok(store.apply_fetch(ticket, peer_id, messages).await)
}

async fn poll_loop<A: MessageApi>(
    api: Arc<A>,
    store: ChatStore,
    peer_id: Uuid,
    interval: Duration,
    stop: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            result = poll_once(api.as_ref(), &store, peer_id) => result,
        };

        match result {
            Ok(FetchOutcome::Replaced) => tracing::debug!(%peer_id, "Conversation updated"),
            Ok(FetchOutcome::Unchanged) => tracing::trace!(%peer_id, "No new messages"),
            Ok(FetchOutcome::Stale) => tracing::debug!(%peer_id, "Discarded stale poll result"),
            Err(e) => {
                tracing::warn!(%peer_id, "Polling failed: {}", e);
                store.dispatch(ChatAction::SetMessagesLoading(false)).await;
            }
        }
    }

    tracing::trace!(%peer_id, "Polling task exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{Message, SendMessageRequest, UserProfile};
    use chrono::Utc;
    use std::sync::atomic::AtomicUsize;

    /// Serves a fixed conversation and counts fetches
    struct FixedApi {
        messages: Mutex<Vec<Message>>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl FixedApi {
        fn new(messages: Vec<Message>) -> Self {
            Self {
                messages: Mutex::new(messages),
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl MessageApi for FixedApi {
        async fn get_messages(&self, _peer_id: Uuid) -> Result<Vec<Message>, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ClientError::network("offline"));
            }
            Ok(self.messages.lock().unwrap().clone())
        }

        async fn send_message(
            &self,
            _peer_id: Uuid,
            _request: SendMessageRequest,
        ) -> Result<Message, ClientError> {
            Err(ClientError::http(501, "not used"))
        }

        async fn get_contacts(&self) -> Result<Vec<UserProfile>, ClientError> {
            Ok(Vec::new())
        }

        async fn get_chat_partners(&self) -> Result<Vec<UserProfile>, ClientError> {
            Ok(Vec::new())
        }
    }

    fn message(from: Uuid, to: Uuid, text: &str) -> Message {
        Message {
            id: Uuid::new_v4(),
            sender_id: from,
            receiver_id: to,
            text: Some(text.to_string()),
            image: None,
            created_at: Utc::now(),
        }
    }

    const INTERVAL: Duration = Duration::from_millis(3000);

    #[tokio::test(start_paused = true)]
    async fn test_fetches_immediately_then_every_interval() {
        let (me, peer) = (Uuid::new_v4(), Uuid::new_v4());
        let api = Arc::new(FixedApi::new(vec![message(me, peer, "a"), message(peer, me, "b")]));
        let store = ChatStore::new();
        store.dispatch(ChatAction::SetSelectedPeer(Some(peer))).await;
        let polling = PollingController::new(Arc::clone(&api), store.clone());

        let handle = polling.start(peer, INTERVAL);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(api.calls(), 1);
        assert_eq!(polling.state(), PollState::Polling { peer_id: peer });

        tokio::time::sleep(INTERVAL).await;
        assert_eq!(api.calls(), 2);

        assert!(polling.stop(handle));
        assert!(!polling.stop(handle));
        tokio::time::sleep(INTERVAL * 3).await;
        assert_eq!(api.calls(), 2);
        assert_eq!(polling.state(), PollState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_identical_poll_does_not_reassign() {
        let (me, peer) = (Uuid::new_v4(), Uuid::new_v4());
        let api = Arc::new(FixedApi::new(vec![message(me, peer, "a"), message(peer, me, "b")]));
        let store = ChatStore::new();
        store.dispatch(ChatAction::SetSelectedPeer(Some(peer))).await;
        let polling = PollingController::new(Arc::clone(&api), store.clone());

        polling.start(peer, INTERVAL);
        tokio::time::sleep(Duration::from_millis(10)).await;
        let first = store.snapshot().await;
        assert_eq!(first.messages.len(), 2);

        tokio::time::sleep(INTERVAL).await;
        assert_eq!(api.calls(), 2);
        let second = store.snapshot().await;
        assert!(Arc::ptr_eq(&first.messages, &second.messages));
        assert_eq!(first.revision, second.revision);
        polling.stop_all();
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_last_id_replaces_state() {
        let (me, peer) = (Uuid::new_v4(), Uuid::new_v4());
        let api = Arc::new(FixedApi::new(vec![message(me, peer, "a")]));
        let store = ChatStore::new();
        store.dispatch(ChatAction::SetSelectedPeer(Some(peer))).await;
        let polling = PollingController::new(Arc::clone(&api), store.clone());

        polling.start(peer, INTERVAL);
        tokio::time::sleep(Duration::from_millis(10)).await;

        let newer = message(peer, me, "new");
        api.messages.lock().unwrap().push(newer.clone());
        tokio::time::sleep(INTERVAL).await;

        let state = store.snapshot().await;
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.last_message_id(), Some(newer.id));
        polling.stop_all();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_swallowed() {
        let peer = Uuid::new_v4();
        let api = Arc::new(FixedApi {
            fail: true,
            ..FixedApi::new(Vec::new())
        });
        let store = ChatStore::new();
        store.dispatch(ChatAction::SetSelectedPeer(Some(peer))).await;
        store.dispatch(ChatAction::SetMessagesLoading(true)).await;
        let polling = PollingController::new(Arc::clone(&api), store.clone());

        polling.start(peer, INTERVAL);
        tokio::time::sleep(INTERVAL * 2 + Duration::from_millis(10)).await;

        assert_eq!(api.calls(), 3);
        assert_eq!(polling.state(), PollState::Polling { peer_id: peer });
        let state = store.snapshot().await;
        assert!(!state.is_messages_loading);
        assert_eq!(state.error, None);
        polling.stop_all();
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_replaces_previous_task() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let api = Arc::new(FixedApi::new(Vec::new()));
        let store = ChatStore::new();
        let polling = PollingController::new(Arc::clone(&api), store.clone());

        let first = polling.start(a, INTERVAL);
        let second = polling.start(b, INTERVAL);
        assert_eq!(polling.state(), PollState::Polling { peer_id: b });
        assert!(!polling.stop(first));
        assert!(polling.stop(second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_raised_to_minimum() {
        let peer = Uuid::new_v4();
        let api = Arc::new(FixedApi::new(Vec::new()));
        let store = ChatStore::new();
        store.dispatch(ChatAction::SetSelectedPeer(Some(peer))).await;
        let polling = PollingController::new(Arc::clone(&api), store.clone());

        polling.start(peer, Duration::ZERO);
        tokio::time::sleep(MIN_POLL_INTERVAL / 2).await;
        assert_eq!(api.calls(), 1);
        assert_eq!(polling.state(), PollState::Polling { peer_id: peer });

        tokio::time::sleep(MIN_POLL_INTERVAL).await;
        assert_eq!(api.calls(), 2);
        polling.stop_all();
    }
}

//! Mock backend for testing.
//!
//! Allows queueing responses per endpoint, forcing failures, counting calls
//! and holding an endpoint open until the test releases it.

use super::{ApiError, RosterApi};
use async_trait::async_trait;
use roster_types::{Contact, Conversation, SessionContext, UserId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

/// The backend endpoints the roster talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Conversation listing.
    Conversations,
    /// Contact search.
    Contacts,
    /// Conversation start.
    StartConversation,
}

/// Mock backend for testing.
///
/// Clones share state, so a test can keep a handle after giving one to the
/// client. An endpoint with nothing queued answers with a transport error.
#[derive(Debug, Default, Clone)]
pub struct MockApi {
    inner: Arc<Mutex<MockApiInner>>,
}

#[derive(Debug, Default)]
struct MockApiInner {
    conversations: VecDeque<Result<Vec<Conversation>, ApiError>>,
    contacts: VecDeque<Result<Vec<Contact>, ApiError>>,
    started: VecDeque<Result<Conversation, ApiError>>,
    calls: HashMap<Endpoint, usize>,
    started_with: Vec<UserId>,
    tokens_seen: Vec<String>,
    held: HashSet<Endpoint>,
    waiting: HashMap<Endpoint, Vec<Arc<Notify>>>,
}

impl MockApi {
    /// Create a new mock backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful conversation listing.
    pub fn queue_conversations(&self, conversations: Vec<Conversation>) {
        let mut inner = self.lock();
        inner.conversations.push_back(Ok(conversations));
    }

    /// Queue a failed conversation listing.
    pub fn fail_conversations(&self, error: ApiError) {
        let mut inner = self.lock();
        inner.conversations.push_back(Err(error));
    }

    /// Queue a successful contact search.
    pub fn queue_contacts(&self, contacts: Vec<Contact>) {
        let mut inner = self.lock();
        inner.contacts.push_back(Ok(contacts));
    }

    /// Queue a failed contact search.
    pub fn fail_contacts(&self, error: ApiError) {
        let mut inner = self.lock();
        inner.contacts.push_back(Err(error));
    }

    /// Queue a successful conversation start.
    pub fn queue_start(&self, conversation: Conversation) {
        let mut inner = self.lock();
        inner.started.push_back(Ok(conversation));
    }

    /// Queue a failed conversation start.
    pub fn fail_start(&self, error: ApiError) {
        let mut inner = self.lock();
        inner.started.push_back(Err(error));
    }

    /// Number of calls made to `endpoint`.
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        let inner = self.lock();
        inner.calls.get(&endpoint).copied().unwrap_or(0)
    }

    /// Every user a conversation start was requested with, in order.
    pub fn started_with(&self) -> Vec<UserId> {
        let inner = self.lock();
        inner.started_with.clone()
    }

    /// Every bearer credential presented, in order.
    pub fn tokens_seen(&self) -> Vec<String> {
        let inner = self.lock();
        inner.tokens_seen.clone()
    }

    /// Make calls to `endpoint` wait until [`release`](Self::release).
    ///
    /// The call is counted before it starts waiting.
    pub fn hold(&self, endpoint: Endpoint) {
        let mut inner = self.lock();
        inner.held.insert(endpoint);
    }

    /// Stop holding `endpoint` and let every waiting call finish.
    pub fn release(&self, endpoint: Endpoint) {
        let gates = {
            let mut inner = self.lock();
            inner.held.remove(&endpoint);
            inner.waiting.remove(&endpoint).unwrap_or_default()
        };
        for gate in gates {
            gate.notify_one();
        }
    }

    /// Let only the most recent waiting call to `endpoint` finish.
    ///
    /// The endpoint stays held. Returns false if no call was waiting.
    pub fn release_last(&self, endpoint: Endpoint) -> bool {
        let gate = {
            let mut inner = self.lock();
            inner.waiting.get_mut(&endpoint).and_then(Vec::pop)
        };
        match gate {
            Some(gate) => {
                gate.notify_one();
                true
            }
            None => false,
        }
    }

    /// Clear all state (queues, counters, holds).
    pub fn reset(&self) {
        let mut inner = self.lock();
        *inner = MockApiInner::default();
    }

    fn lock(&self) -> MutexGuard<'_, MockApiInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and wait on the endpoint's gate if it is held.
    async fn enter(&self, endpoint: Endpoint, session: &SessionContext) {
        let gate = {
            let mut inner = self.lock();
            *inner.calls.entry(endpoint).or_insert(0) += 1;
            inner.tokens_seen.push(session.token().to_string());
            if inner.held.contains(&endpoint) {
                let gate = Arc::new(Notify::new());
                inner.waiting.entry(endpoint).or_default().push(gate.clone());
                Some(gate)
            } else {
                None
            }
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

fn nothing_queued() -> ApiError {
    ApiError::Transport("no response queued".into())
}

#[async_trait]
impl RosterApi for MockApi {
    async fn list_conversations(
        &self,
        session: &SessionContext,
    ) -> Result<Vec<Conversation>, ApiError> {
        self.enter(Endpoint::Conversations, session).await;
        let mut inner = self.lock();
        inner
            .conversations
            .pop_front()
            .unwrap_or_else(|| Err(nothing_queued()))
    }

    async fn search_contacts(&self, session: &SessionContext) -> Result<Vec<Contact>, ApiError> {
        self.enter(Endpoint::Contacts, session).await;
        let mut inner = self.lock();
        inner
            .contacts
            .pop_front()
            .unwrap_or_else(|| Err(nothing_queued()))
    }

    async fn start_conversation(
        &self,
        session: &SessionContext,
        other: &UserId,
    ) -> Result<Conversation, ApiError> {
        {
            let mut inner = self.lock();
            inner.started_with.push(other.clone());
        }
        self.enter(Endpoint::StartConversation, session).await;
        let mut inner = self.lock();
        inner
            .started
            .pop_front()
            .unwrap_or_else(|| Err(nothing_queued()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn session() -> SessionContext {
        SessionContext::new(UserId::new("me"), "tok")
    }

    fn chat(id: &str) -> Conversation {
        Conversation::new(
            id,
            [
                Contact::new("me", "Me", true),
                Contact::new("u1", "Ann", false),
            ],
            vec![],
        )
        .unwrap()
    }

    // ===========================================
    // Queueing
    // ===========================================

    #[tokio::test]
    async fn returns_queued_responses_in_order() {
        let api = MockApi::new();
        api.queue_conversations(vec![chat("c1")]);
        api.queue_conversations(vec![chat("c1"), chat("c2")]);

        assert_eq!(api.list_conversations(&session()).await.unwrap().len(), 1);
        assert_eq!(api.list_conversations(&session()).await.unwrap().len(), 2);
        assert_eq!(api.calls(Endpoint::Conversations), 2);
    }

    #[tokio::test]
    async fn empty_queue_is_transport_error() {
        let api = MockApi::new();
        let err = api.search_contacts(&session()).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[tokio::test]
    async fn forced_failure_is_returned() {
        let api = MockApi::new();
        api.fail_start(ApiError::Status {
            status: 400,
            message: Some("nope".into()),
        });

        let err = api
            .start_conversation(&session(), &UserId::new("u1"))
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("nope"));
        assert_eq!(api.started_with(), vec![UserId::new("u1")]);
    }

    #[tokio::test]
    async fn records_tokens_and_shares_state_across_clones() {
        let api = MockApi::new();
        let handle = api.clone();
        api.queue_contacts(vec![]);

        api.search_contacts(&session()).await.unwrap();

        assert_eq!(handle.tokens_seen(), vec!["tok".to_string()]);
        assert_eq!(handle.calls(Endpoint::Contacts), 1);
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let api = MockApi::new();
        api.queue_contacts(vec![]);
        api.search_contacts(&session()).await.unwrap();
        api.queue_contacts(vec![]);

        api.reset();

        assert_eq!(api.calls(Endpoint::Contacts), 0);
        assert!(api.search_contacts(&session()).await.is_err());
    }

    // ===========================================
    // Holding
    // ===========================================

    #[tokio::test]
    async fn held_call_waits_for_release() {
        let api = MockApi::new();
        api.queue_start(chat("c1"));
        api.hold(Endpoint::StartConversation);

        let held = {
            let api = api.clone();
            tokio::spawn(async move {
                api.start_conversation(&session(), &UserId::new("u1"))
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!held.is_finished());
        assert_eq!(api.calls(Endpoint::StartConversation), 1);

        api.release(Endpoint::StartConversation);
        let chat = held.await.unwrap().unwrap();
        assert_eq!(chat.id().as_str(), "c1");
    }

    #[tokio::test]
    async fn release_last_lets_newest_call_through_first() {
        let api = MockApi::new();
        api.queue_contacts(vec![Contact::new("u1", "Ann", false)]);
        api.queue_contacts(vec![]);
        api.hold(Endpoint::Contacts);

        let older = {
            let api = api.clone();
            tokio::spawn(async move { api.search_contacts(&session()).await })
        };
        while api.calls(Endpoint::Contacts) < 1 {
            tokio::task::yield_now().await;
        }
        let newer = {
            let api = api.clone();
            tokio::spawn(async move { api.search_contacts(&session()).await })
        };
        while api.calls(Endpoint::Contacts) < 2 {
            tokio::task::yield_now().await;
        }

        assert!(api.release_last(Endpoint::Contacts));
        // The first call to finish takes the first queued response.
        assert_eq!(newer.await.unwrap().unwrap().len(), 1);
        assert!(!older.is_finished());

        api.release(Endpoint::Contacts);
        assert!(older.await.unwrap().unwrap().is_empty());
        assert!(!api.release_last(Endpoint::Contacts));
    }
}

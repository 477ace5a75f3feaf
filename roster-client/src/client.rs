//! RosterClient - the main interface for the chat roster.
//!
//! This module provides [`RosterClient`], which loads the signed-in user's
//! conversations and candidate contacts and starts or resumes conversations.
//!
//! # Architecture
//!
//! RosterClient uses a pure state machine (from roster-core) for roster
//! logic and interprets the actions to perform actual I/O via the
//! [`RosterApi`] trait.
//!
//! ```text
//! Presentation → RosterClient → RosterApi → Backend
//!                     ↓
//!               roster-core (pure state machine)
//! ```
//!
//! Fetches are never cancelled. Each one takes a liveness token before it
//! starts, and its result is dropped if the view was deactivated (or
//! re-activated) while it was outstanding. Overlapping fetches of the same
//! list are ordered by issue: a response that arrives after a newer one has
//! been applied is dropped.
//!
//! # Example
//!
//! ```ignore
//! use roster_client::{HttpApi, MemorySessionStore, RecordingNavigator, RosterClient};
//!
//! let client = RosterClient::new(
//!     HttpApi::new("http://localhost:5001"),
//!     Arc::new(MemorySessionStore::signed_in("token", "u1")),
//!     Arc::new(RecordingNavigator::new()),
//! );
//!
//! client.activate().await;
//! let view = client.view(Utc::now()).await?;
//! ```

use chrono::{DateTime, Utc};
use roster_core::{
    Action, Liveness, LivenessToken, RequestSeq, RosterEvent, RosterInput, RosterState,
    RosterView, SingleFlight, ViewError, ViewOptions,
};
use roster_types::{Conversation, ConversationId, SessionContext, UserId};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};

use crate::api::{ApiError, Operation, RosterApi};
use crate::navigation::{Navigator, Route};
use crate::session::{self, SessionStore};

/// Capacity of the event channel. Slow subscribers miss older events.
const EVENT_CAPACITY: usize = 64;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The roster has not been activated with a session.
    #[error("roster is not active")]
    NotActivated,

    /// The roster could not be rendered.
    #[error("view error: {0}")]
    View(#[from] ViewError),
}

/// Fetch errors.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The roster has not been activated with a session.
    #[error("roster is not active")]
    NotActivated,

    /// The view was deactivated or re-activated while the fetch was outstanding.
    #[error("result discarded: view is no longer live")]
    Stale,

    /// A fetch issued later has already applied its result.
    #[error("result discarded: superseded by a newer fetch")]
    Superseded,

    /// The backend call failed. The user-facing message is already in state.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Conversation start errors.
#[derive(Debug, Error)]
pub enum StartError {
    /// Another start is still outstanding; this request was ignored.
    #[error("a conversation start is already in flight")]
    InFlight,

    /// The roster has not been activated with a session.
    #[error("roster is not active")]
    NotActivated,

    /// The backend call failed.
    #[error("{message}")]
    Failed {
        /// User-facing notice text.
        message: String,
        /// Underlying backend error.
        #[source]
        source: ApiError,
    },
}

/// Outcome of [`RosterClient::activate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// A session was resolved and the initial fetches ran.
    Ready,
    /// No usable session; the user was sent to the login route.
    Redirected,
}

/// Which fetches a batch of actions asked for.
#[derive(Debug, Default)]
struct Requested {
    conversations: bool,
    contacts: bool,
}

/// The roster client.
///
/// Owns the roster state and drives it from backend results.
pub struct RosterClient<A: RosterApi> {
    api: A,
    sessions: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    options: ViewOptions,
    session: Mutex<Option<SessionContext>>,
    state: Mutex<RosterState>,
    liveness: Liveness,
    conversation_seq: RequestSeq,
    contact_seq: RequestSeq,
    starting: SingleFlight,
    events: broadcast::Sender<RosterEvent>,
}

impl<A: RosterApi> RosterClient<A> {
    /// Create a new RosterClient.
    pub fn new(api: A, sessions: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            sessions,
            navigator,
            options: ViewOptions::default(),
            session: Mutex::new(None),
            state: Mutex::new(RosterState::new()),
            liveness: Liveness::new(),
            conversation_seq: RequestSeq::new(),
            contact_seq: RequestSeq::new(),
            starting: SingleFlight::new(),
            events,
        }
    }

    /// Set the options used by [`view`](Self::view).
    pub fn with_view_options(mut self, options: ViewOptions) -> Self {
        self.options = options;
        self
    }

    /// Subscribe to roster events.
    pub fn subscribe(&self) -> broadcast::Receiver<RosterEvent> {
        self.events.subscribe()
    }

    /// Activate the roster.
    ///
    /// Resolves the session once. Without one, navigates to login and makes
    /// no backend calls. Otherwise enters the loading phase and runs the
    /// conversation and contact fetches concurrently, returning when both
    /// have settled. Fetch failures end up in state, not in the return value.
    pub async fn activate(&self) -> Activation {
        let Some(session) = session::resolve(self.sessions.as_ref()) else {
            tracing::info!("No session found, redirecting to login");
            self.navigate(&Route::Login);
            return Activation::Redirected;
        };

        let token = self.liveness.activate();
        *self.session.lock().await = Some(session.clone());
        tracing::info!("Roster activated for {}", session.user_id());

        let input = RosterInput::Activated {
            session_user: session.user_id().clone(),
        };
        if let Some(actions) = self.apply_live(token, input).await {
            self.run(actions).await;
        }
        Activation::Ready
    }

    /// Deactivate the roster.
    ///
    /// Outstanding fetches keep running but their results are discarded.
    pub async fn deactivate(&self) {
        self.liveness.deactivate();
        {
            let mut state = self.state.lock().await;
            let (next, _actions) = std::mem::take(&mut *state).on_event(RosterInput::Deactivated);
            *state = next;
        }
        *self.session.lock().await = None;
        tracing::info!("Roster deactivated");
    }

    /// Fetch the conversation list and apply the result.
    ///
    /// On success the list is replaced and the error slot cleared. On failure
    /// the previous list is kept and the error slot holds a user-facing
    /// message.
    pub async fn fetch_conversations(&self) -> Result<(), FetchError> {
        let token = self.liveness.token();
        let seq = self.conversation_seq.issue();
        let session = self.current_session().await.ok_or(FetchError::NotActivated)?;

        let result = self.api.list_conversations(&session).await;
        let (input, outcome) = match result {
            Ok(conversations) => {
                tracing::debug!("Fetched {} conversations", conversations.len());
                (RosterInput::ConversationsLoaded { conversations }, Ok(()))
            }
            Err(e) => {
                tracing::warn!("Conversation fetch failed: {}", e);
                let message = Operation::FetchConversations.user_message(&e);
                (RosterInput::ConversationsFailed { message }, Err(FetchError::Api(e)))
            }
        };

        let actions = self
            .apply_latest(token, &self.conversation_seq, seq, input)
            .await
            .map_err(|e| {
                tracing::debug!("Discarding conversation fetch result: {}", e);
                e
            })?;
        self.dispatch(actions);
        outcome
    }

    /// Fetch the candidate contacts and apply the result.
    ///
    /// Failures are logged and leave the list (and the error slot) unchanged.
    pub async fn fetch_contacts(&self) -> Result<(), FetchError> {
        let token = self.liveness.token();
        let seq = self.contact_seq.issue();
        let session = self.current_session().await.ok_or(FetchError::NotActivated)?;

        let result = self.api.search_contacts(&session).await;
        let (input, outcome) = match result {
            Ok(contacts) => {
                tracing::debug!("Fetched {} contacts", contacts.len());
                (RosterInput::ContactsLoaded { contacts }, Ok(()))
            }
            Err(e) => {
                let error = format!("{}: {}", Operation::FetchContacts.user_message(&e), e);
                (RosterInput::ContactsFailed { error }, Err(FetchError::Api(e)))
            }
        };

        let actions = self
            .apply_latest(token, &self.contact_seq, seq, input)
            .await
            .map_err(|e| {
                tracing::debug!("Discarding contact fetch result: {}", e);
                e
            })?;
        self.dispatch(actions);
        outcome
    }

    /// Re-issue the conversation fetch after a failure.
    ///
    /// Does not re-enter the loading phase.
    pub async fn retry(&self) -> Result<(), FetchError> {
        let token = self.liveness.token();
        let actions = self
            .apply_live(token, RosterInput::RetryRequested)
            .await
            .ok_or(FetchError::NotActivated)?;
        if self.dispatch(actions).conversations {
            self.fetch_conversations().await
        } else {
            Ok(())
        }
    }

    /// Start a conversation with `other`, or resume the existing one.
    ///
    /// While a start is outstanding, further requests are ignored and
    /// return [`StartError::InFlight`] without calling the backend. On
    /// success the client navigates to the conversation; on failure it
    /// emits a [`RosterEvent::Notice`]. Neither touches the roster lists.
    pub async fn start_or_resume(&self, other: &UserId) -> Result<Conversation, StartError> {
        let Some(_permit) = self.starting.try_acquire() else {
            tracing::warn!("Ignoring start with {}: another start is in flight", other);
            return Err(StartError::InFlight);
        };
        let token = self.liveness.token();
        let session = self.current_session().await.ok_or(StartError::NotActivated)?;

        match self.api.start_conversation(&session, other).await {
            Ok(conversation) => {
                tracing::info!("Conversation {} ready with {}", conversation.id(), other);
                if self.liveness.is_live(token) {
                    self.navigate(&Route::Conversation(conversation.id().clone()));
                }
                Ok(conversation)
            }
            Err(source) => {
                tracing::warn!("Failed to start conversation with {}: {}", other, source);
                let message = Operation::StartConversation.user_message(&source);
                if self.liveness.is_live(token) {
                    self.emit(RosterEvent::Notice {
                        message: message.clone(),
                    });
                }
                Err(StartError::Failed { message, source })
            }
        }
    }

    /// Open an existing conversation.
    pub fn open_conversation(&self, id: &ConversationId) {
        self.navigate(&Route::Conversation(id.clone()));
    }

    /// Return to the roster.
    pub fn back(&self) {
        self.navigate(&Route::Home);
    }

    /// Render the roster as of `now`.
    pub async fn view(&self, now: DateTime<Utc>) -> Result<RosterView, ClientError> {
        let session = self.current_session().await.ok_or(ClientError::NotActivated)?;
        let state = self.state.lock().await;
        let view = RosterView::derive(&state, session.user_id(), now, &self.options)
            .map_err(|e| {
                tracing::error!("Cannot render roster: {}", e);
                e
            })?;
        Ok(view.with_starting(self.is_starting()))
    }

    /// Render the roster as of the current time.
    pub async fn view_now(&self) -> Result<RosterView, ClientError> {
        self.view(Utc::now()).await
    }

    /// Snapshot of the roster state.
    pub async fn state(&self) -> RosterState {
        self.state.lock().await.clone()
    }

    /// True while the first conversation fetch of this activation is outstanding.
    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.is_loading()
    }

    /// The conversation fetch error, if any.
    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error().map(str::to_string)
    }

    /// True while a conversation start is outstanding.
    pub fn is_starting(&self) -> bool {
        self.starting.is_in_flight()
    }

    /// Get a reference to the underlying API (for testing).
    pub fn api(&self) -> &A {
        &self.api
    }

    async fn current_session(&self) -> Option<SessionContext> {
        self.session.lock().await.clone()
    }

    /// Apply `input` if `token` is still live. `None` means the input was discarded.
    async fn apply_live(&self, token: LivenessToken, input: RosterInput) -> Option<Vec<Action>> {
        let mut state = self.state.lock().await;
        if !self.liveness.is_live(token) {
            return None;
        }
        let (next, actions) = std::mem::take(&mut *state).on_event(input);
        *state = next;
        Some(actions)
    }

    /// Apply a fetch result if `token` is live and no newer fetch of the
    /// same list has applied its result.
    async fn apply_latest(
        &self,
        token: LivenessToken,
        seq: &RequestSeq,
        issued: u64,
        input: RosterInput,
    ) -> Result<Vec<Action>, FetchError> {
        let mut state = self.state.lock().await;
        if !self.liveness.is_live(token) {
            return Err(FetchError::Stale);
        }
        if !seq.try_apply(issued) {
            return Err(FetchError::Superseded);
        }
        let (next, actions) = std::mem::take(&mut *state).on_event(input);
        *state = next;
        Ok(actions)
    }

    /// Perform side-effect actions; report which fetches were requested.
    fn dispatch(&self, actions: Vec<Action>) -> Requested {
        let mut requested = Requested::default();
        for action in actions {
            match action {
                Action::FetchConversations => requested.conversations = true,
                Action::FetchContacts => requested.contacts = true,
                Action::LogDiagnostic { error } => tracing::warn!("{}", error),
                Action::EmitEvent(event) => self.emit(event),
            }
        }
        requested
    }

    /// Dispatch actions and run the requested fetches concurrently.
    async fn run(&self, actions: Vec<Action>) {
        let requested = self.dispatch(actions);
        // Failures are already reflected in state.
        match (requested.conversations, requested.contacts) {
            (true, true) => {
                let _ = tokio::join!(self.fetch_conversations(), self.fetch_contacts());
            }
            (true, false) => {
                let _ = self.fetch_conversations().await;
            }
            (false, true) => {
                let _ = self.fetch_contacts().await;
            }
            (false, false) => {}
        }
    }

    fn navigate(&self, route: &Route) {
        self.navigator.go_to(route);
        self.emit(RosterEvent::Navigated { path: route.path() });
    }

    fn emit(&self, event: RosterEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

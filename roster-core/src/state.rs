//! Roster state machine.
//!
//! This module provides a pure, side-effect-free state machine for the
//! roster. It takes events as input and produces a new state plus a list of
//! actions to execute.
//!
//! The actual I/O (HTTP requests, logging, notifying the presentation layer)
//! is performed by roster-client, not by this module. The conversation and
//! contact collections are disjoint slices of the state: an event for one
//! never touches the other.

use roster_types::{Contact, Conversation, UserId};

/// Lifecycle phase of a roster view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Not activated, or deactivated. Fetch results are ignored.
    #[default]
    Inactive,
    /// Activated; the first conversation fetch has not settled yet.
    Loading,
    /// Activated; the first conversation fetch has settled.
    Ready,
}

/// Roster state - NO I/O, just state transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterState {
    phase: Phase,
    session_user: Option<UserId>,
    conversations: Vec<Conversation>,
    contacts: Vec<Contact>,
    error: Option<String>,
}

impl RosterState {
    /// Create an inactive roster with empty collections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function - no side effects. The caller (roster-client)
    /// is responsible for executing the returned actions.
    pub fn on_event(self, event: RosterInput) -> (Self, Vec<Action>) {
        match (self.phase, event) {
            (_, RosterInput::Activated { session_user }) => (
                Self {
                    phase: Phase::Loading,
                    session_user: Some(session_user),
                    ..Self::default()
                },
                vec![Action::FetchConversations, Action::FetchContacts],
            ),

            (Phase::Inactive, _) => (self, vec![]),

            (_, RosterInput::Deactivated) => (Self::default(), vec![]),

            (_, RosterInput::ConversationsLoaded { conversations }) => {
                let count = conversations.len();
                (
                    Self {
                        phase: Phase::Ready,
                        conversations,
                        error: None,
                        ..self
                    },
                    vec![Action::EmitEvent(RosterEvent::ConversationsUpdated { count })],
                )
            }

            (_, RosterInput::ConversationsFailed { message }) => (
                Self {
                    phase: Phase::Ready,
                    error: Some(message.clone()),
                    ..self
                },
                vec![Action::EmitEvent(RosterEvent::ConversationsFailed {
                    message,
                })],
            ),

            (_, RosterInput::ContactsLoaded { contacts }) => {
                let contacts = match &self.session_user {
                    Some(me) => exclude_user(contacts, me),
                    None => contacts,
                };
                let count = contacts.len();
                (
                    Self { contacts, ..self },
                    vec![Action::EmitEvent(RosterEvent::ContactsUpdated { count })],
                )
            }

            // Contact failures stay out of the error slot.
            (_, RosterInput::ContactsFailed { error }) => {
                (self, vec![Action::LogDiagnostic { error }])
            }

            (_, RosterInput::RetryRequested) => (self, vec![Action::FetchConversations]),
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True between activation and deactivation.
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Inactive
    }

    /// True until the first conversation fetch of this activation settles.
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// The session user this roster was activated for.
    pub fn session_user(&self) -> Option<&UserId> {
        self.session_user.as_ref()
    }

    /// Conversations from the last successful fetch.
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Candidate contacts from the last successful fetch, session user excluded.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// The user-visible conversation fetch error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Drop every contact whose id is the session user's.
pub fn exclude_user(contacts: Vec<Contact>, user: &UserId) -> Vec<Contact> {
    contacts.into_iter().filter(|c| &c.id != user).collect()
}

/// Inputs that drive the roster state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterInput {
    /// The view became active for this session user.
    Activated {
        /// The resolved session user.
        session_user: UserId,
    },
    /// The view was torn down.
    Deactivated,
    /// Conversation fetch succeeded.
    ConversationsLoaded {
        /// The fresh collection, in backend order.
        conversations: Vec<Conversation>,
    },
    /// Conversation fetch failed.
    ConversationsFailed {
        /// User-facing failure message.
        message: String,
    },
    /// Contact fetch succeeded.
    ContactsLoaded {
        /// The fresh collection, possibly including the session user.
        contacts: Vec<Contact>,
    },
    /// Contact fetch failed.
    ContactsFailed {
        /// Diagnostic description of the failure.
        error: String,
    },
    /// The user asked to retry the conversation fetch.
    RetryRequested,
}

/// Actions to be executed by the roster-client.
///
/// These are instructions, not side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Issue the conversation fetch.
    FetchConversations,
    /// Issue the contact fetch.
    FetchContacts,
    /// Record a failure for diagnostics only.
    LogDiagnostic {
        /// What went wrong.
        error: String,
    },
    /// Emit an event to the presentation layer.
    EmitEvent(RosterEvent),
}

/// Events emitted to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterEvent {
    /// The conversation collection was replaced.
    ConversationsUpdated {
        /// Number of conversations now held.
        count: usize,
    },
    /// The conversation fetch failed; the error slot is set.
    ConversationsFailed {
        /// User-facing failure message.
        message: String,
    },
    /// The contact collection was replaced.
    ContactsUpdated {
        /// Number of contacts now held.
        count: usize,
    },
    /// A transient, dismissable notice (e.g. a failed conversation start).
    Notice {
        /// Notice text.
        message: String,
    },
    /// The client asked the navigation collaborator to go somewhere.
    Navigated {
        /// Target path.
        path: String,
    },
}

//! Backend API abstraction for the roster.
//!
//! This module provides a pluggable seam over the chat backend's REST
//! endpoints (HTTP for real use, mock for testing).
//!
//! # Design
//!
//! Every call takes the resolved [`SessionContext`] and returns a typed
//! result. Transport failures, non-success statuses and malformed bodies
//! all come back as [`ApiError`]; callers turn any of them into a
//! user-facing string with [`Operation::user_message`], so the distinction
//! never leaks into roster state.
//!
//! # Example
//!
//! ```ignore
//! let api = HttpApi::new("http://localhost:5001");
//! let conversations = api.list_conversations(&session).await?;
//! ```

mod http;
mod mock;

pub use http::HttpApi;
pub use mock::{Endpoint, MockApi};

use async_trait::async_trait;
use roster_types::{Contact, Conversation, SessionContext, UserId};
use thiserror::Error;

/// Backend call errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("server returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        /// HTTP status code.
        status: u16,
        /// The body's `message` field, if it had one.
        message: Option<String>,
    },

    /// The body did not match the expected schema.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// The server-supplied message, if the backend sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// The three backend operations, for picking fallback messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `GET /api/chat`
    FetchConversations,
    /// `GET /api/users/search`
    FetchContacts,
    /// `POST /api/chat/start`
    StartConversation,
}

impl Operation {
    /// Message used when the backend rejected the call without saying why.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Operation::FetchConversations => "Failed to fetch chats",
            Operation::FetchContacts => "Failed to fetch users",
            Operation::StartConversation => "Failed to start chat",
        }
    }

    /// Message used when the backend could not be reached.
    pub fn unreachable_message(&self) -> &'static str {
        match self {
            Operation::FetchConversations => "Failed to connect to server",
            Operation::FetchContacts => "Failed to fetch users",
            Operation::StartConversation => "Failed to start chat. Please try again.",
        }
    }

    /// The user-facing text for a failed call.
    pub fn user_message(&self, error: &ApiError) -> String {
        match error {
            ApiError::Transport(_) => self.unreachable_message().to_string(),
            ApiError::Status { .. } | ApiError::Decode(_) => error
                .server_message()
                .unwrap_or(self.fallback_message())
                .to_string(),
        }
    }
}

/// The chat backend, as seen by the roster.
///
/// Implementations handle the underlying mechanism (HTTP, mock, etc).
#[async_trait]
pub trait RosterApi: Send + Sync {
    /// Conversations of the session user, with participants and messages.
    async fn list_conversations(
        &self,
        session: &SessionContext,
    ) -> Result<Vec<Conversation>, ApiError>;

    /// Candidate contacts. May include the session user.
    async fn search_contacts(&self, session: &SessionContext) -> Result<Vec<Contact>, ApiError>;

    /// Start a conversation with `other`, or return the existing one.
    async fn start_conversation(
        &self,
        session: &SessionContext,
        other: &UserId,
    ) -> Result<Conversation, ApiError>;
}

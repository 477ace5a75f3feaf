//! Endpoint paths and request/response bodies of the chat backend.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// `GET` - conversations of the session user.
pub const CONVERSATIONS_PATH: &str = "/api/chat";

/// `GET` - candidate contacts.
pub const CONTACTS_PATH: &str = "/api/users/search";

/// `POST` - start or resume a conversation.
pub const START_CONVERSATION_PATH: &str = "/api/chat/start";

/// Body of a start-conversation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartConversation {
    /// The contact to talk to.
    #[serde(rename = "otherUserId")]
    pub other_user_id: UserId,
}

/// Body of a non-success response.
///
/// The backend usually includes a human-readable `message`, but callers
/// must cope with it being absent (or with the body not being JSON).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable failure description.
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Parse an error body, treating anything unparseable as message-less.
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// The message, if present and non-empty.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

//! Roster entities: contacts, messages and conversations.
//!
//! Each entity deserializes through a raw wire record and is validated on
//! the way in, so code past the fetch boundary never re-checks shape.
//! Serialization writes the same field names the backend uses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ConversationId, ModelError, UserId};

/// A user as returned by the directory query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ContactRecord")]
pub struct Contact {
    /// Backend user id.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Name shown in the roster.
    #[serde(rename = "name")]
    pub display_name: String,
    /// Avatar image URL, if the user set one.
    #[serde(rename = "avatar", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Free-form location, if the user set one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Presence flag as reported by the backend.
    #[serde(rename = "isOnline")]
    pub is_online: bool,
}

impl Contact {
    /// Create a contact with no avatar or location.
    pub fn new(id: impl Into<UserId>, display_name: &str, is_online: bool) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.to_string(),
            avatar_url: None,
            location: None,
            is_online,
        }
    }

    /// Set the avatar URL.
    pub fn with_avatar(mut self, url: &str) -> Self {
        self.avatar_url = Some(url.to_string());
        self
    }

    /// Set the location.
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }
}

/// Raw contact shape on the wire.
#[derive(Debug, Deserialize)]
struct ContactRecord {
    #[serde(rename = "_id")]
    id: UserId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default, rename = "isOnline")]
    is_online: bool,
}

impl TryFrom<ContactRecord> for Contact {
    type Error = ModelError;

    fn try_from(record: ContactRecord) -> Result<Self, Self::Error> {
        if record.id.is_empty() {
            return Err(ModelError::MissingId { entity: "user" });
        }
        Ok(Self {
            id: record.id,
            display_name: record.name,
            avatar_url: record.avatar.filter(|url| !url.is_empty()),
            location: record.location.filter(|loc| !loc.is_empty()),
            is_online: record.is_online,
        })
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message text.
    pub content: String,
    /// When the message was sent.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message.
    pub fn new(content: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            content: content.to_string(),
            timestamp,
        }
    }
}

/// A two-party conversation with its message history.
///
/// Messages are kept in append order, so the last element is the most
/// recent message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConversationRecord")]
pub struct Conversation {
    #[serde(rename = "_id")]
    id: ConversationId,
    participants: [Contact; 2],
    messages: Vec<Message>,
}

impl Conversation {
    /// Create a conversation, checking that the two participants differ.
    pub fn new(
        id: impl Into<ConversationId>,
        participants: [Contact; 2],
        messages: Vec<Message>,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ModelError::MissingId {
                entity: "conversation",
            });
        }
        if participants[0].id == participants[1].id {
            return Err(ModelError::DuplicateParticipant {
                conversation: id.to_string(),
                user: participants[0].id.to_string(),
            });
        }
        Ok(Self {
            id,
            participants,
            messages,
        })
    }

    /// The conversation id.
    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    /// Both participants, in backend order.
    pub fn participants(&self) -> &[Contact; 2] {
        &self.participants
    }

    /// Messages in append order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// True if `user` is one of the two participants.
    pub fn has_participant(&self, user: &UserId) -> bool {
        self.participants.iter().any(|p| &p.id == user)
    }
}

/// Raw conversation shape on the wire.
#[derive(Debug, Deserialize)]
struct ConversationRecord {
    #[serde(rename = "_id")]
    id: ConversationId,
    #[serde(default)]
    participants: Vec<Contact>,
    #[serde(default)]
    messages: Vec<Message>,
}

impl TryFrom<ConversationRecord> for Conversation {
    type Error = ModelError;

    fn try_from(record: ConversationRecord) -> Result<Self, Self::Error> {
        let count = record.participants.len();
        let participants: [Contact; 2] =
            record
                .participants
                .try_into()
                .map_err(|_| ModelError::ParticipantCount {
                    conversation: record.id.to_string(),
                    count,
                })?;
        Conversation::new(record.id, participants, record.messages)
    }
}

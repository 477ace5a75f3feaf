//! View derivation for the roster.
//!
//! Everything here is a pure function of already-fetched entities and the
//! current time. Nothing mutates the entities; rows are rebuilt on every
//! read from whatever [`RosterState`] currently holds.

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use roster_types::{Contact, Conversation, ConversationId, UserId};
use thiserror::Error;

use crate::state::RosterState;

/// Preview shown for a conversation with no messages.
pub const NO_MESSAGES_PLACEHOLDER: &str = "No messages yet";

/// Maximum characters of the last message shown in a preview.
pub const PREVIEW_CHARS: usize = 50;

/// Appended to a preview that was cut short.
pub const ELLIPSIS: &str = "...";

/// Calendar date format for instants a week or more in the past.
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Avatar used when a contact has none.
pub const DEFAULT_AVATAR_URL: &str = "https://randomuser.me/api/portraits/lego/1.jpg";

/// Conversation title used when the other participant has no name.
pub const UNKNOWN_USER_LABEL: &str = "Unknown User";

/// Location label used when a contact has none.
pub const NO_LOCATION_LABEL: &str = "Location not specified";

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Data-integrity errors found while deriving the view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// The session user is not one of the two participants, so the
    /// counterpart cannot be told apart.
    #[error("conversation {conversation} does not include session user {user}")]
    NotAParticipant {
        /// The broken conversation.
        conversation: ConversationId,
        /// The session user.
        user: UserId,
    },
}

/// Two-state presence indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// The user is online.
    Online,
    /// The user is offline.
    Offline,
}

impl Presence {
    /// Label shown next to the indicator.
    pub fn label(&self) -> &'static str {
        match self {
            Presence::Online => "Online",
            Presence::Offline => "Offline",
        }
    }

    /// True for [`Presence::Online`].
    pub fn is_online(&self) -> bool {
        matches!(self, Presence::Online)
    }
}

impl From<bool> for Presence {
    fn from(is_online: bool) -> Self {
        if is_online {
            Presence::Online
        } else {
            Presence::Offline
        }
    }
}

/// The participant whose id differs from `session_user`.
///
/// Participants are distinct by construction, so the only way this fails is
/// a conversation that does not include the session user at all.
pub fn counterpart<'a>(
    conversation: &'a Conversation,
    session_user: &UserId,
) -> Result<&'a Contact, ViewError> {
    let [first, second] = conversation.participants();
    if &first.id == session_user {
        Ok(second)
    } else if &second.id == session_user {
        Ok(first)
    } else {
        Err(ViewError::NotAParticipant {
            conversation: conversation.id().clone(),
            user: session_user.clone(),
        })
    }
}

/// Preview of the last message, or [`NO_MESSAGES_PLACEHOLDER`].
pub fn last_message_preview(conversation: &Conversation) -> String {
    preview_with(conversation, PREVIEW_CHARS)
}

fn preview_with(conversation: &Conversation, max_chars: usize) -> String {
    match conversation.last_message() {
        Some(message) => truncate_preview(&message.content, max_chars),
        None => NO_MESSAGES_PLACEHOLDER.to_string(),
    }
}

/// Cut `content` to `max_chars` characters, marking the cut with [`ELLIPSIS`].
///
/// Counts Unicode scalar values, so multi-byte text is never split
/// mid-character.
pub fn truncate_preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &content[..cut], ELLIPSIS),
        None => content.to_string(),
    }
}

/// Timestamp of the last message, if any.
pub fn last_message_instant(conversation: &Conversation) -> Option<DateTime<Utc>> {
    conversation.last_message().map(|m| m.timestamp)
}

/// Human-readable elapsed time between `instant` and `now`.
///
/// Calendar dates are rendered in UTC.
pub fn relative_time(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    relative_time_with(instant, now, DEFAULT_DATE_FORMAT, Utc.fix())
}

/// [`relative_time`] with a caller-chosen calendar date format and offset.
///
/// Brackets use floor division of the elapsed milliseconds and include their
/// lower bound. Instants in the future read as "Just now". Calendar dates
/// are taken at `utc_offset`. An unusable `date_format` falls back to
/// [`DEFAULT_DATE_FORMAT`].
pub fn relative_time_with(
    instant: DateTime<Utc>,
    now: DateTime<Utc>,
    date_format: &str,
    utc_offset: FixedOffset,
) -> String {
    let elapsed = (now - instant).num_milliseconds();
    let minutes = elapsed.div_euclid(MINUTE_MS);
    let hours = elapsed.div_euclid(HOUR_MS);
    let days = elapsed.div_euclid(DAY_MS);

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if days < 7 {
        format!("{}d ago", days)
    } else {
        calendar_date(instant.with_timezone(&utc_offset), date_format)
    }
}

fn calendar_date(instant: DateTime<FixedOffset>, date_format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", instant.format(date_format)).is_err() {
        out.clear();
        // The default format is known-good.
        let _ = write!(out, "{}", instant.format(DEFAULT_DATE_FORMAT));
    }
    out
}

/// Knobs for deriving rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    /// Maximum preview length in characters.
    pub preview_chars: usize,
    /// strftime-style format for calendar dates.
    pub date_format: String,
    /// Avatar used when a contact has none.
    pub default_avatar_url: String,
    /// Offset calendar dates are rendered at.
    pub utc_offset: FixedOffset,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            preview_chars: PREVIEW_CHARS,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            default_avatar_url: DEFAULT_AVATAR_URL.to_string(),
            utc_offset: Utc.fix(),
        }
    }
}

/// One row of the "recent conversations" list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRow {
    /// The conversation to open when the row is selected.
    pub id: ConversationId,
    /// The other participant's id.
    pub counterpart_id: UserId,
    /// The other participant's name.
    pub title: String,
    /// Avatar of the other participant.
    pub avatar_url: String,
    /// Last message preview.
    pub preview: String,
    /// Relative time of the last message; absent for empty conversations.
    pub last_activity: Option<String>,
    /// Presence of the other participant.
    pub presence: Presence,
}

/// One row of the "start new conversation" list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    /// The contact to start a conversation with.
    pub id: UserId,
    /// Name shown in the row.
    pub display_name: String,
    /// Avatar, falling back to the default.
    pub avatar_url: String,
    /// Location, falling back to [`NO_LOCATION_LABEL`].
    pub location: String,
    /// Presence indicator.
    pub presence: Presence,
}

/// Text shown in place of an empty list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    /// Main line.
    pub title: &'static str,
    /// Secondary line.
    pub hint: Option<&'static str>,
}

/// Placeholder for an empty conversation list.
pub const NO_CONVERSATIONS: Placeholder = Placeholder {
    title: "No conversations yet",
    hint: Some("Start a chat with someone below!"),
};

/// Placeholder for an empty contact list.
pub const NO_CONTACTS: Placeholder = Placeholder {
    title: "No users available",
    hint: None,
};

/// Presentation-ready snapshot of the whole roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterView {
    /// Recent conversations.
    pub conversations: Vec<ConversationRow>,
    /// Candidate contacts.
    pub contacts: Vec<ContactRow>,
    /// Conversation fetch error with a retry affordance.
    pub error: Option<String>,
    /// Initial conversation fetch still outstanding.
    pub loading: bool,
    /// A conversation start is in flight.
    pub starting: bool,
}

impl RosterView {
    /// Derive the view from the current state.
    ///
    /// Fails on the first conversation without a counterpart rather than
    /// rendering a row with made-up identity.
    pub fn derive(
        state: &RosterState,
        session_user: &UserId,
        now: DateTime<Utc>,
        options: &ViewOptions,
    ) -> Result<Self, ViewError> {
        let conversations = state
            .conversations()
            .iter()
            .map(|c| conversation_row(c, session_user, now, options))
            .collect::<Result<Vec<_>, _>>()?;
        let contacts = state
            .contacts()
            .iter()
            .map(|c| contact_row(c, options))
            .collect();

        Ok(Self {
            conversations,
            contacts,
            error: state.error().map(str::to_string),
            loading: state.is_loading(),
            starting: false,
        })
    }

    /// Mark whether a conversation start is in flight.
    pub fn with_starting(mut self, starting: bool) -> Self {
        self.starting = starting;
        self
    }

    /// Placeholder for the conversation list, if it is empty.
    pub fn conversations_placeholder(&self) -> Option<Placeholder> {
        self.conversations.is_empty().then_some(NO_CONVERSATIONS)
    }

    /// Placeholder for the contact list, if it is empty.
    pub fn contacts_placeholder(&self) -> Option<Placeholder> {
        self.contacts.is_empty().then_some(NO_CONTACTS)
    }
}

/// Build the row for one conversation.
pub fn conversation_row(
    conversation: &Conversation,
    session_user: &UserId,
    now: DateTime<Utc>,
    options: &ViewOptions,
) -> Result<ConversationRow, ViewError> {
    let other = counterpart(conversation, session_user)?;
    Ok(ConversationRow {
        id: conversation.id().clone(),
        counterpart_id: other.id.clone(),
        title: title_for(other),
        avatar_url: avatar_or_default(other, options),
        preview: preview_with(conversation, options.preview_chars),
        last_activity: last_message_instant(conversation)
            .map(|at| relative_time_with(at, now, &options.date_format, options.utc_offset)),
        presence: Presence::from(other.is_online),
    })
}

/// Build the row for one candidate contact.
pub fn contact_row(contact: &Contact, options: &ViewOptions) -> ContactRow {
    ContactRow {
        id: contact.id.clone(),
        display_name: contact.display_name.clone(),
        avatar_url: avatar_or_default(contact, options),
        location: contact
            .location
            .clone()
            .unwrap_or_else(|| NO_LOCATION_LABEL.to_string()),
        presence: Presence::from(contact.is_online),
    }
}

fn title_for(other: &Contact) -> String {
    if other.display_name.trim().is_empty() {
        UNKNOWN_USER_LABEL.to_string()
    } else {
        other.display_name.clone()
    }
}

fn avatar_or_default(contact: &Contact, options: &ViewOptions) -> String {
    contact
        .avatar_url
        .clone()
        .unwrap_or_else(|| options.default_avatar_url.clone())
}

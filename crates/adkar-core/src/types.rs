use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Messages
// =============================================================================

/// Opaque, time-ordered message identifier.
///
/// The only stable identity of a message, used for rendering keys and
/// feedback correlation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a fresh id. UUID v7 embeds a millisecond timestamp, so ids
    /// created later sort later.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for MessageId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Snapshot of a conversation: ordered history plus the busy flag.
///
/// `busy` is true only while a user message is waiting for its reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub busy: bool,
}

impl ConversationState {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// The most recent assistant message, if any.
    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role() == Role::Assistant)
    }
}

// =============================================================================
// Feedback
// =============================================================================

/// Rating value meaning "no stars selected".
pub const RATING_UNSET: u8 = 0;

/// Highest star rating.
pub const RATING_MAX: u8 = 5;

/// Feedback on one assistant reply, in the wire shape the sinks expect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub message_id: MessageId,
    /// 1..=5 stars, or 0 when unset.
    pub rating: u8,
    pub categories: Vec<String>,
    pub comment: String,
}

/// An improvement category a user can tag feedback with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct FeedbackCategory {
    pub id: &'static str,
    pub label: &'static str,
}

/// The fixed set of feedback categories, in display order.
pub static FEEDBACK_CATEGORIES: [FeedbackCategory; 4] = [
    FeedbackCategory {
        id: "accuracy",
        label: "Response Accuracy",
    },
    FeedbackCategory {
        id: "clarity",
        label: "Clarity of Explanation",
    },
    FeedbackCategory {
        id: "relevance",
        label: "Relevance to Question",
    },
    FeedbackCategory {
        id: "completeness",
        label: "Completeness of Answer",
    },
];

impl FeedbackCategory {
    pub fn all() -> &'static [FeedbackCategory] {
        &FEEDBACK_CATEGORIES
    }

    pub fn find(id: &str) -> Option<&'static FeedbackCategory> {
        FEEDBACK_CATEGORIES.iter().find(|c| c.id == id)
    }

    pub fn is_known(id: &str) -> bool {
        Self::find(id).is_some()
    }
}

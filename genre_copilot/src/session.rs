//! Transcript of one copilot conversation.
//!
//! The session is owned by the [`Copilot`](crate::Copilot) that drives it;
//! there is no process-wide history.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use genre_core::{ChatMessage, Role};

/// A conversation session with full message history.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    /// Session identifier
    pub id: Uuid,
    messages: Vec<ChatMessage>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Create a new empty conversation session.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append one user turn and the assistant turn that answered it.
    pub fn record_exchange(&mut self, user: String, assistant: String) {
        self.messages.push(ChatMessage {
            role: Role::User,
            content: user,
        });
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content: assistant,
        });
        self.updated_at = Utc::now();
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Clear all messages from the session.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.updated_at = Utc::now();
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}
